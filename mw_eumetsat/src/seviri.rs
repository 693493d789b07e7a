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

//! CHIMP compliant filenames for SEVIRI inputs and CHIMP outputs, e.g. `seviri_20150731_22_12.nc`

use std::path::PathBuf;
use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use mw_common::parse::{DateTimeParser, SeviriIdParser};
use crate::Result;

pub const DEFAULT_EXTENSION: &str = ".nc";

#[derive(Debug,Clone,Copy,PartialEq,Eq,Display,EnumString)]
#[strum(serialize_all="lowercase")]
pub enum ChimpFilesPrefix {
    /// resampled SEVIRI files that are fed into CHIMP
    Seviri,
    /// retrieval results produced by CHIMP
    Chimp,
}

/// `<prefix>_<year><month><day>_<hour>_<minute><extension>`
pub fn datetime_to_filename (prefix: ChimpFilesPrefix, dt: &DateTime<Utc>, extension: &str)->PathBuf {
    PathBuf::from( format!("{}_{}{}", prefix, dt.format("%Y%m%d_%H_%M"), extension))
}

pub fn input_filename_from_datetime (dt: &DateTime<Utc>)->PathBuf {
    datetime_to_filename( ChimpFilesPrefix::Seviri, dt, DEFAULT_EXTENSION)
}

pub fn output_filename_from_datetime (dt: &DateTime<Utc>)->PathBuf {
    datetime_to_filename( ChimpFilesPrefix::Chimp, dt, DEFAULT_EXTENSION)
}

pub fn input_filename_from_product_id (product_id: &str)->Result<PathBuf> {
    Ok( input_filename_from_datetime( &SeviriIdParser::parse( product_id)?) )
}

pub fn output_filename_from_product_id (product_id: &str)->Result<PathBuf> {
    Ok( output_filename_from_datetime( &SeviriIdParser::parse( product_id)?) )
}
