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

use crate::{define_error, map_to_opaque_error};

define_error!{ pub MwError =
    IOError(#[from] std::io::Error) : "IO error: {0}",
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    ConfigError(#[from] ron::error::SpannedError) : "config error: {0}",
    ParseError(String) : "{0}",
    ValueError(String) : "{0}",
    IndexError(String) : "{0}",
    NotFoundError(String) : "not found: {0}",
    CommandError(String) : "command failed: {0}",
    OpFailed(String) : "operation failed: {0}"
}

map_to_opaque_error!{ serde_json::Error => MwError::ParseError }

pub type Result<T> = std::result::Result<T, MwError>;

pub fn value_error (msg: impl ToString)->MwError {
    MwError::ValueError(msg.to_string())
}

pub fn parse_error (msg: impl ToString)->MwError {
    MwError::ParseError(msg.to_string())
}

pub fn index_error (msg: impl ToString)->MwError {
    MwError::IndexError(msg.to_string())
}

pub fn command_error (msg: impl ToString)->MwError {
    MwError::CommandError(msg.to_string())
}

pub fn op_failed (msg: impl ToString)->MwError {
    MwError::OpFailed(msg.to_string())
}
