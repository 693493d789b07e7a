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

//! the external resampler that turns SEVIRI native files into CHIMP input files

use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use strum::Display;
use tracing::info;

use mw_common::fs::path_to_lossy_string;
use mw_common::process::run_command;

use crate::errors::Result;
use crate::validation::{ValidationErrors, check_existing_file};

/// resampler program that is used if the task does not specify one
pub const DEFAULT_RESAMPLER: &str = "monkey_wrench_resample";

pub const DEFAULT_RADIUS_OF_INFLUENCE: u64 = 20000;

/// target area, either an area definition file or an inline definition that includes its `area_name`
#[derive(Debug,Clone,PartialEq,Deserialize)]
#[serde(untagged)]
pub enum Area {
    File(PathBuf),
    Definition(Mapping),
}

impl Area {
    pub fn validate (&self, loc: String, errors: &mut ValidationErrors) {
        match self {
            Area::File(path) => check_existing_file( errors, loc, path),
            Area::Definition(map) => {
                if !map.contains_key( "area_name") {
                    errors.add( loc, "{..}", "Area definition requires an 'area_name'");
                }
            }
        }
    }

    fn as_argument (&self)->Result<String> {
        match self {
            Area::File(path) => Ok( path_to_lossy_string( path)),
            Area::Definition(map) => Ok( serde_json::to_string( map)? )
        }
    }
}

/// remote file buffering modes, which we accept but do not use
#[derive(Debug,Clone,Copy,PartialEq,Eq,Deserialize,Display)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase")]
pub enum FsCache {
    Filecache,
    Blockcache,
}

pub fn default_dataset_save_options ()->Mapping {
    let mut map = Mapping::new();
    map.insert( Value::from("writer"), Value::from("cf"));
    map.insert( Value::from("include_lonlats"), Value::from(false));
    map
}

#[derive(Debug,Clone,PartialEq)]
pub struct Resampler {
    pub program: String,
    pub area: Area,
    pub radius_of_influence: u64,
    pub remove_file_if_exists: bool,
    pub dataset_save_options: Mapping,
}

impl Resampler {
    /// `--area <file|json> --radius-of-influence <m> --save-options <json> <input> <output>`
    pub fn arguments (&self, input: &Path, output: &Path)->Result<Vec<String>> {
        Ok( vec![
            "--area".to_string(), self.area.as_argument()?,
            "--radius-of-influence".to_string(), self.radius_of_influence.to_string(),
            "--save-options".to_string(), serde_json::to_string( &self.dataset_save_options)?,
            path_to_lossy_string( input),
            path_to_lossy_string( output),
        ])
    }

    /// resample `input` into `output`. Existing output files are either removed first or kept (and the input skipped)
    pub async fn resample (&self, input: &Path, output: &Path)->Result<PathBuf> {
        if output.exists() {
            if self.remove_file_if_exists {
                fs::remove_file( output)?;
            } else {
                info!("{:?} already exists, skipping resampling of {:?}", output, input);
                return Ok( output.to_path_buf())
            }
        }

        run_command( &self.program, &self.arguments( input, output)?).await?;
        Ok( output.to_path_buf())
    }
}
