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

//! `chimp.retrieve`: run CHIMP retrievals over sliding windows of input files

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum::Display;
use tracing::{info, warn};

use mw_common::datetime::de_datetime;
use mw_common::fs::{DateTimeDirectory, DirectoryVisitor, TempDirectory, copy_files_between_directories, path_to_lossy_string,
                    remove_files_in_directory};
use mw_common::list::DatedList;
use mw_common::parse::{DateTimeParser, FilePathParser};
use mw_common::pattern::{Pattern, de_strings};
use mw_common::process::run_command;
use mw_eumetsat::seviri::{ChimpFilesPrefix, datetime_to_filename};

use crate::errors::{Result, value_error};
use crate::task::{TaskResults, default_true};
use crate::validation::{Validate, ValidationErrors, check_existing_dir, check_existing_file, check_output_file,
                        check_period, check_positive, field};

/// env var to set the CHIMP executable, which otherwise is `chimp`
pub const CHIMP_ENV_VAR: &str = "MONKEY_WRENCH_CHIMP";

pub const DEFAULT_CHIMP: &str = "chimp";

#[derive(Debug,Clone,Copy,PartialEq,Eq,Deserialize,Display)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

#[derive(Debug,Clone,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrieveSpecifications {
    #[serde(deserialize_with="de_datetime")]
    pub start_datetime: DateTime<Utc>,

    #[serde(deserialize_with="de_datetime")]
    pub end_datetime: DateTime<Utc>,

    /// resampled SEVIRI input files
    pub input_directory: PathBuf,

    #[serde(default, deserialize_with="de_strings")]
    pub sub_strings: Option<Vec<String>>,

    #[serde(default="default_true")]
    pub case_sensitive: bool,

    #[serde(default="default_true")]
    pub match_all: bool,

    #[serde(default="default_true")]
    pub recursive: bool,

    #[serde(default)]
    pub reverse: bool,

    pub output_filepath: Option<PathBuf>,

    pub model_filepath: PathBuf,

    pub output_directory: PathBuf,

    pub temp_directory: PathBuf,

    #[serde(default="default_device")]
    pub device: Device,

    #[serde(default="default_sequence_length")]
    pub sequence_length: usize,

    #[serde(default)]
    pub temporal_overlap: usize,

    #[serde(default="default_tile_size")]
    pub tile_size: usize,

    #[serde(default="default_verbose")]
    pub verbose: usize,

    /// overrides `MONKEY_WRENCH_CHIMP`
    pub chimp_program: Option<String>,
}

fn default_device()->Device { Device::Cpu }
fn default_sequence_length()->usize { 16 }
fn default_tile_size()->usize { 256 }
fn default_verbose()->usize { 1 }

impl RetrieveSpecifications {
    pub fn directory_visitor (&self)->DirectoryVisitor {
        let pattern = Pattern { sub_strings: self.sub_strings.clone(), case_sensitive: self.case_sensitive, match_all: self.match_all };
        let mut visitor = DirectoryVisitor::new( &self.input_directory).with_pattern( pattern).with_recursive( self.recursive).with_reverse( self.reverse);
        visitor.output_filepath = self.output_filepath.clone();
        visitor
    }

    pub fn chimp_program (&self)->String {
        self.chimp_program.clone()
            .or_else( || std::env::var( CHIMP_ENV_VAR).ok())
            .unwrap_or_else( || DEFAULT_CHIMP.to_string())
    }

    /// `process <model> seviri <inputs..> <output_dir> --device .. --sequence_length .. --temporal_overlap .. --tile_size .. --verbose ..`
    pub fn chimp_arguments (&self, inputs: &[String], output_dir: &Path)->Vec<String> {
        let mut args = vec![
            "process".to_string(),
            path_to_lossy_string( &self.model_filepath),
            "seviri".to_string(),
        ];
        args.extend( inputs.iter().cloned());
        args.push( path_to_lossy_string( output_dir));

        for (opt, value) in [
            ("--device", self.device.to_string()),
            ("--sequence_length", self.sequence_length.to_string()),
            ("--temporal_overlap", self.temporal_overlap.to_string()),
            ("--tile_size", self.tile_size.to_string()),
            ("--verbose", self.verbose.to_string()),
        ] {
            args.push( opt.to_string());
            args.push( value);
        }
        args
    }
}

impl Validate for RetrieveSpecifications {
    fn validate (&self, loc: &str, errors: &mut ValidationErrors) {
        check_period( errors, loc, &self.start_datetime, &self.end_datetime);
        check_existing_dir( errors, field( loc, "input_directory"), &self.input_directory);
        if let Some(path) = &self.output_filepath {
            check_output_file( errors, field( loc, "output_filepath"), path);
        }
        check_existing_file( errors, field( loc, "model_filepath"), &self.model_filepath);
        check_existing_dir( errors, field( loc, "output_directory"), &self.output_directory);
        check_existing_dir( errors, field( loc, "temp_directory"), &self.temp_directory);
        check_positive( errors, field( loc, "sequence_length"), self.sequence_length);
        check_positive( errors, field( loc, "tile_size"), self.tile_size);
        check_positive( errors, field( loc, "verbose"), self.verbose);
    }
}

/// run CHIMP for one batch and move the result for the last (most recent) input into its datetime directory.
/// Returns the number of copied output files
async fn run_chimp (specs: &RetrieveSpecifications, batch: &[String], temp_dir: &Path, datetime_dir: &DateTimeDirectory)->Result<usize> {
    if batch.len() != specs.sequence_length {
        return Err( value_error( format!("Expected to receive {} input files but got {} instead!", specs.sequence_length, batch.len())))
    }
    let Some(last) = batch.last() else { return Ok(0) };

    run_command( &specs.chimp_program(), &specs.chimp_arguments( batch, temp_dir)).await?;

    let dt = FilePathParser::parse( last)?;
    let snapshot = path_to_lossy_string( datetime_to_filename( ChimpFilesPrefix::Chimp, &dt, ""));
    let output_dir = datetime_dir.create( &dt, false)?;

    let n = copy_files_between_directories( temp_dir, &output_dir, &Pattern::new( &[snapshot.as_str()]))?;
    if n == 0 {
        warn!("no CHIMP output for {dt} in {:?}", temp_dir);
    }

    remove_files_in_directory( temp_dir)?;
    Ok(n)
}

pub async fn retrieve (specs: &RetrieveSpecifications)->Result<TaskResults> {
    let files: Vec<String> = specs.directory_visitor().visit()?.iter().map( path_to_lossy_string).collect();
    let list = DatedList::<FilePathParser>::new( &files)?;
    let indices = list.query_indices( &specs.start_datetime, &specs.end_datetime)?;

    let (Some(first), Some(last)) = (indices.first(), indices.last()) else {
        warn!("no input files between {} and {}", specs.start_datetime, specs.end_datetime);
        return Ok( vec![("number of batches", 0), ("number of retrieved files", 0)])
    };

    let batches = list.generate_k_sized_batches_by_index( specs.sequence_length, *first as isize, *last as isize)?;
    info!("running CHIMP for {} batches of {} input files", batches.len(), specs.sequence_length);

    let temp_dir = TempDirectory::new_in( &specs.temp_directory)?;
    let datetime_dir = DateTimeDirectory::new( &specs.output_directory);

    let mut n_retrieved = 0;
    for batch in &batches {
        n_retrieved += run_chimp( specs, batch, temp_dir.path(), &datetime_dir).await?;
    }

    Ok( vec![
        ("number of batches", batches.len()),
        ("number of retrieved files", n_retrieved),
    ])
}
