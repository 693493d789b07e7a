/*
 * Copyright © 2024, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

//! common utilities for monkey_wrench crates: datetime ranges and batches, product/file name parsers,
//! dated lists, filesystem visitors and writers, worker pool, external commands and download helpers

pub mod macros;
pub mod errors;
pub mod datetime;
pub mod parse;
pub mod pattern;
pub mod fs;
pub mod list;
pub mod geometry;
pub mod process;
pub mod net;
pub mod config;

pub use errors::*;
