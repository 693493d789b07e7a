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

//! datetime parsers for SEVIRI product IDs and CHIMP compliant file paths

use std::path::Path;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::errors::{Result, parse_error};

lazy_static! {
    // e.g. "MSG3-SEVI-MSG15-0100-NA-20150731221240.036000000Z-NA"
    static ref SEVIRI_ID_RE: Regex = Regex::new(
        r"[0-9A-Za-z]+-SEVI-[0-9A-Za-z]+-[0-9]+-NA-([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})[0-9]{2}\.[0-9]+Z-NA"
    ).unwrap();

    // file stem, e.g. "seviri_20150731_22_12"
    static ref FILE_PATH_RE: Regex = Regex::new(
        r"[0-9A-Za-z]+_([0-9]{4})([0-9]{2})([0-9]{2})_([0-9]{2})_([0-9]{2})"
    ).unwrap();
}

/// something that can extract a (minute resolution) UTC datetime from a string item
pub trait DateTimeParser {
    fn parse (item: &str)->Result<DateTime<Utc>>;

    fn parse_collection<S: AsRef<str>> (items: &[S])->Result<Vec<DateTime<Utc>>> {
        items.iter().map( |item| Self::parse( item.as_ref())).collect()
    }

    fn validate (item: &str)->bool {
        Self::parse(item).is_ok()
    }
}

fn unparsable (item: &str)->crate::MwError {
    parse_error( format!("Could not parse {item} into a valid datetime object."))
}

/// all our patterns capture year, month, day, hour, minute in this order
fn datetime_from_captures (item: &str, caps: &Captures)->Result<DateTime<Utc>> {
    let field = |i: usize| -> Result<u32> {
        caps.get(i).and_then( |m| m.as_str().parse::<u32>().ok()).ok_or_else( || unparsable(item))
    };

    NaiveDate::from_ymd_opt( field(1)? as i32, field(2)?, field(3)?)
        .and_then( |d| d.and_hms_opt( field(4).ok()?, field(5).ok()?, 0))
        .map( |ndt| ndt.and_utc())
        .ok_or_else( || unparsable(item))
}

pub struct SeviriIdParser;

impl DateTimeParser for SeviriIdParser {
    fn parse (item: &str)->Result<DateTime<Utc>> {
        let caps = SEVIRI_ID_RE.captures( item).ok_or_else( || unparsable(item))?;
        datetime_from_captures( item, &caps)
    }
}

/// parses the stem of the last path element, so both plain filenames and full paths are accepted
pub struct FilePathParser;

impl DateTimeParser for FilePathParser {
    fn parse (item: &str)->Result<DateTime<Utc>> {
        let stem = Path::new(item).file_stem().and_then( |s| s.to_str()).ok_or_else( || unparsable(item))?;
        let caps = FILE_PATH_RE.captures( stem).ok_or_else( || unparsable(item))?;
        datetime_from_captures( item, &caps)
    }
}
