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

//! `files.verify` and `files.fetch`: check local product files against reference IDs, download and resample
//! product files

use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_yaml::Mapping;
use tracing::{debug, error, info, warn};

use mw_common::datetime::de_datetime;
use mw_common::fs::{DateTimeDirectory, DirectoryVisitor, FilesIntegrityValidator, TempDirectory, compare_files_against_reference,
                    path_to_lossy_string, read_items};
use mw_common::list::DatedList;
use mw_common::parse::{DateTimeParser, FilePathParser, SeviriIdParser};
use mw_common::pattern::{Pattern, de_strings};
use mw_common::process::run_multiple;
use mw_eumetsat::{EumetsatApi, EumetsatCollection};
use mw_eumetsat::seviri::input_filename_from_product_id;

use crate::errors::Result;
use crate::task::{TaskResults, default_true, default_tolerance, default_processes};
use crate::task::resampler::{Area, DEFAULT_RESAMPLER, DEFAULT_RADIUS_OF_INFLUENCE, FsCache, Resampler, default_dataset_save_options};
use crate::validation::{Validate, ValidationErrors, check_existing_dir, check_existing_file, check_output_file,
                        check_period, check_positive, field};

/* #region verify ********************************************************************************************/

/// where the expected product IDs come from
#[derive(Debug,Clone,PartialEq,Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Items(Vec<String>),
    Visitor(ReferenceVisitor),
    File(PathBuf),
}

/// directory with files that have product IDs in their names
#[derive(Debug,Clone,PartialEq,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceVisitor {
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
}

impl ReferenceVisitor {
    pub fn directory_visitor (&self)->DirectoryVisitor {
        let pattern = Pattern { sub_strings: self.sub_strings.clone(), case_sensitive: self.case_sensitive, match_all: self.match_all };
        DirectoryVisitor::new( &self.input_directory).with_pattern( pattern).with_recursive( self.recursive).with_reverse( self.reverse)
    }
}

#[derive(Debug,Clone,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifySpecifications {
    #[serde(deserialize_with="de_datetime")]
    pub start_datetime: DateTime<Utc>,

    #[serde(deserialize_with="de_datetime")]
    pub end_datetime: DateTime<Utc>,

    /// the files to verify
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

    /// optional list of all visited files
    pub output_filepath: Option<PathBuf>,

    /// files are only checked for corruption if this is set
    pub nominal_size: Option<u64>,

    #[serde(default="default_tolerance")]
    pub tolerance: f64,

    /// files are only checked for completeness if this (or `input_filepath`) is set
    pub reference: Option<Reference>,

    /// text file with reference product IDs, used if there is no `reference`
    pub input_filepath: Option<PathBuf>,

    #[serde(default="default_true")]
    pub trim: bool,
}

impl VerifySpecifications {
    pub fn directory_visitor (&self)->DirectoryVisitor {
        let pattern = Pattern { sub_strings: self.sub_strings.clone(), case_sensitive: self.case_sensitive, match_all: self.match_all };
        let mut visitor = DirectoryVisitor::new( &self.input_directory).with_pattern( pattern).with_recursive( self.recursive).with_reverse( self.reverse);
        visitor.output_filepath = self.output_filepath.clone();
        visitor
    }

    pub fn integrity_validator (&self)->FilesIntegrityValidator {
        FilesIntegrityValidator { nominal_size: self.nominal_size, tolerance: self.tolerance }
    }

    /// None if no reference is given
    pub fn reference_items (&self)->Result<Option<Vec<String>>> {
        let items = match (&self.reference, &self.input_filepath) {
            (Some(Reference::Items(items)), _) => items.clone(),
            (Some(Reference::File(path)), _) => read_items( path, self.trim)?,
            (Some(Reference::Visitor(v)), _) => v.directory_visitor().visit()?.iter().map( path_to_lossy_string).collect(),
            (None, Some(path)) => read_items( path, self.trim)?,
            (None, None) => return Ok(None)
        };
        Ok( Some(items) )
    }
}

impl Validate for VerifySpecifications {
    fn validate (&self, loc: &str, errors: &mut ValidationErrors) {
        check_period( errors, loc, &self.start_datetime, &self.end_datetime);
        check_existing_dir( errors, field( loc, "input_directory"), &self.input_directory);
        if let Some(path) = &self.output_filepath {
            check_output_file( errors, field( loc, "output_filepath"), path);
        }
        if !(self.tolerance >= 0.0) {
            errors.add( field( loc, "tolerance"), self.tolerance, "Input should be greater than or equal to 0");
        }
        match &self.reference {
            Some(Reference::File(path)) => check_existing_file( errors, field( loc, "reference"), path),
            Some(Reference::Visitor(v)) => check_existing_dir( errors, field( loc, "reference.input_directory"), &v.input_directory),
            _ => {}
        }
        if let Some(path) = &self.input_filepath {
            check_existing_file( errors, field( loc, "input_filepath"), path);
        }
    }
}

/// items of `items` that fall into `[start,end)` according to parser `P`. Empty lists stay empty
fn query_items<P: DateTimeParser> (items: &[String], start: &DateTime<Utc>, end: &DateTime<Utc>)->Result<Vec<String>> {
    if items.is_empty() {
        Ok( Vec::new() )
    } else {
        Ok( DatedList::<P>::new( items)?.query( start, end)? )
    }
}

pub fn verify (specs: &VerifySpecifications)->Result<TaskResults> {
    let (start, end) = (&specs.start_datetime, &specs.end_datetime);

    let visited: Vec<String> = specs.directory_visitor().visit()?.iter().map( path_to_lossy_string).collect();
    let files: Vec<PathBuf> = query_items::<FilePathParser>( &visited, start, end)?.into_iter().map( PathBuf::from).collect();

    let reference = match specs.reference_items()? {
        Some(items) if !items.is_empty() => Some( DatedList::<SeviriIdParser>::new( &items)?.query_datetimes( start, end)?),
        Some(_) => Some( Vec::new()),
        None => None
    };

    let (missing, corrupted) = compare_files_against_reference(
        &files,
        reference.as_deref(),
        |path| FilePathParser::parse( &path_to_lossy_string( path)),
        &specs.integrity_validator()
    )?;

    let missing = missing.unwrap_or_default();
    let mut sorted: Vec<_> = missing.iter().collect();
    sorted.sort();
    for dt in sorted {
        debug!("missing file for {dt}");
    }

    Ok( vec![
        ("number of files found", files.len()),
        ("number of reference items", reference.map( |r| r.len()).unwrap_or(0)),
        ("number of missing files", missing.len()),
        ("number of corrupted files", corrupted.map( |c| c.len()).unwrap_or(0)),
    ])
}

/* #endregion verify */

/* #region fetch *********************************************************************************************/

#[derive(Debug,Clone,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSpecifications {
    #[serde(deserialize_with="de_datetime")]
    pub start_datetime: DateTime<Utc>,

    #[serde(deserialize_with="de_datetime")]
    pub end_datetime: DateTime<Utc>,

    #[serde(default="default_processes")]
    pub number_of_processes: usize,

    pub area: Area,

    #[serde(default="default_radius_of_influence")]
    pub radius_of_influence: u64,

    #[serde(default="default_resampler")]
    pub resampler: String,

    pub cache: Option<FsCache>,

    /// text file with the product IDs to fetch
    pub input_filepath: PathBuf,

    #[serde(default="default_true")]
    pub trim: bool,

    /// downloads go into a scratch directory below this one
    pub temp_directory: PathBuf,

    /// resampled files end up in datetime sub directories of this one
    pub output_directory: PathBuf,

    #[serde(default="default_true")]
    pub remove_file_if_exists: bool,

    #[serde(default="default_dataset_save_options")]
    pub dataset_save_options: Mapping,
}

fn default_radius_of_influence()->u64 { DEFAULT_RADIUS_OF_INFLUENCE }
fn default_resampler()->String { DEFAULT_RESAMPLER.to_string() }

impl FetchSpecifications {
    pub fn resampler (&self)->Resampler {
        Resampler {
            program: self.resampler.clone(),
            area: self.area.clone(),
            radius_of_influence: self.radius_of_influence,
            remove_file_if_exists: self.remove_file_if_exists,
            dataset_save_options: self.dataset_save_options.clone(),
        }
    }

    pub fn datetime_directory (&self)->DateTimeDirectory {
        DateTimeDirectory::new( &self.output_directory)
    }
}

impl Validate for FetchSpecifications {
    fn validate (&self, loc: &str, errors: &mut ValidationErrors) {
        check_period( errors, loc, &self.start_datetime, &self.end_datetime);
        check_positive( errors, field( loc, "number_of_processes"), self.number_of_processes);
        self.area.validate( field( loc, "area"), errors);
        if self.resampler.trim().is_empty() {
            errors.add( field( loc, "resampler"), &self.resampler, "Input should be a non-empty program name");
        }
        check_existing_file( errors, field( loc, "input_filepath"), &self.input_filepath);
        check_existing_dir( errors, field( loc, "temp_directory"), &self.temp_directory);
        check_existing_dir( errors, field( loc, "output_directory"), &self.output_directory);
    }
}

/// resample the extracted native file of `product_id` into its datetime directory. The native file is removed
/// afterwards, whether resampling succeeded or not
pub async fn resample_native_file (resampler: &Resampler, datetime_dir: &DateTimeDirectory, product_id: &str,
                                   native_file: &Path)->Result<PathBuf> {
    let dt = SeviriIdParser::parse( product_id)?;
    let output = datetime_dir.path( &dt).join( input_filename_from_product_id( product_id)?);

    let result = resampler.resample( native_file, &output).await;

    if let Err(e) = fs::remove_file( native_file) {
        warn!("could not remove {:?}: {}", native_file, e);
    }
    result
}

/// download, extract and resample a single product
async fn fetch_product (api: &EumetsatApi, resampler: &Resampler, datetime_dir: &DateTimeDirectory, temp_dir: &Path,
                        product_id: &str)->Result<PathBuf> {
    let native_file = api.fetch_seviri_native_file( product_id, temp_dir).await?;
    resample_native_file( resampler, datetime_dir, product_id, &native_file).await
}

pub async fn fetch (specs: &FetchSpecifications)->Result<TaskResults> {
    let api = EumetsatApi::from_env( EumetsatCollection::Seviri)?;
    fetch_with( &api, specs).await
}

/// failed products are logged and counted, they do not abort the task
pub async fn fetch_with (api: &EumetsatApi, specs: &FetchSpecifications)->Result<TaskResults> {
    if let Some(cache) = specs.cache {
        warn!("Remote file caching ('{cache}') is not supported, the cache option is ignored.");
    }

    let ids = read_items( &specs.input_filepath, specs.trim)?;
    let product_ids = query_items::<SeviriIdParser>( &ids, &specs.start_datetime, &specs.end_datetime)?;

    let datetime_dir = specs.datetime_directory();
    for product_id in &product_ids {
        datetime_dir.create( &SeviriIdParser::parse( product_id)?, false)?;
    }

    let mut n_failed = 0;
    if !product_ids.is_empty() {
        let resampler = specs.resampler();
        let temp_dir = TempDirectory::new_in( &specs.temp_directory)?;

        let results = run_multiple( product_ids.iter(), specs.number_of_processes, |product_id: &String| {
            fetch_product( api, &resampler, &datetime_dir, temp_dir.path(), product_id)
        }).await;

        for (product_id, result) in product_ids.iter().zip( results) {
            match result {
                Ok(path) => info!("product {product_id} saved to {path:?}"),
                Err(e) => {
                    error!("fetching product {product_id} failed: {e}");
                    n_failed += 1;
                }
            }
        }
    }

    Ok( vec![
        ("number of product ids", product_ids.len()),
        ("number of fetched files", product_ids.len() - n_failed),
        ("number of failed fetches", n_failed),
    ])
}

/* #endregion fetch */
