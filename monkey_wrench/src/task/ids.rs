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

//! `ids.fetch`: query product IDs in batches and write them to a text file

use std::fs::File;
use std::path::PathBuf;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::debug;

use mw_common::datetime::{DateTimePeriod, DateTimeRangeInBatches, de_datetime, de_time_interval};
use mw_common::fs::write_items;
use mw_eumetsat::{EumetsatApi, EumetsatCollection};

use crate::errors::Result;
use crate::task::TaskResults;
use crate::validation::{Validate, ValidationErrors, check_output_file, check_period, field};

#[derive(Debug,Clone,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSpecifications {
    #[serde(deserialize_with="de_datetime")]
    pub start_datetime: DateTime<Utc>,

    #[serde(deserialize_with="de_datetime")]
    pub end_datetime: DateTime<Utc>,

    #[serde(deserialize_with="de_time_interval")]
    pub batch_interval: TimeDelta,

    pub output_filepath: PathBuf,

    #[serde(default="default_collection")]
    pub collection: EumetsatCollection,
}

fn default_collection()->EumetsatCollection { EumetsatCollection::Seviri }

impl FetchSpecifications {
    pub fn range_in_batches (&self)->DateTimeRangeInBatches {
        DateTimeRangeInBatches {
            period: DateTimePeriod::new( self.start_datetime, self.end_datetime),
            batch_interval: self.batch_interval
        }
    }
}

impl Validate for FetchSpecifications {
    fn validate (&self, loc: &str, errors: &mut ValidationErrors) {
        check_period( errors, loc, &self.start_datetime, &self.end_datetime);
        if self.batch_interval <= TimeDelta::zero() {
            errors.add( field( loc, "batch_interval"), self.batch_interval, "Input should be a positive time interval");
        }
        check_output_file( errors, field( loc, "output_filepath"), &self.output_filepath);
    }
}

pub async fn fetch (specs: &FetchSpecifications)->Result<TaskResults> {
    let api = EumetsatApi::from_env( specs.collection)?;
    fetch_with( &api, specs).await
}

/// IDs are appended batch by batch, so the output file keeps everything retrieved before a failing batch
pub async fn fetch_with (api: &EumetsatApi, specs: &FetchSpecifications)->Result<TaskResults> {
    let range = specs.range_in_batches();
    let (start, end) = range.period.as_tuple( false);
    let path = &specs.output_filepath;

    File::create( path)?;
    let mut n = 0;
    api.query_in_batches( &start, &end, range.batch_interval, |batch| {
        n += write_items( path, batch.ids.iter(), true)?;
        debug!("{} IDs written to {:?}", n, path);
        Ok(())
    }).await?;

    Ok( vec![
        ("number of items successfully fetched and written to the file", n)
    ])
}
