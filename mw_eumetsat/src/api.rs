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

//! product searches and downloads

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zip::read::ZipArchive;

use mw_common::datetime::{Order, assert_start_precedes_end, floor_datetime_minutes_to_specific_snapshots, generate_datetime_batches};
use mw_common::geometry::Polygon;
use mw_common::net::{bearer_headers, download_url_with_retry};

use crate::{
    AccessToken, Credentials, EumetsatCollection, EumetsatConfig, EumetsatError, Result,
    load_config, make_collection_url, op_failed, request_token
};

/// product IDs found by a search, together with the total number of matching products reported by the server
#[derive(Debug,Clone,PartialEq,Default)]
pub struct SearchResults {
    pub total_results: usize,
    pub ids: Vec<String>,
}

impl SearchResults {
    pub fn len (&self)->usize { self.ids.len() }
    pub fn is_empty (&self)->bool { self.ids.is_empty() }
}

#[derive(Deserialize,Debug)]
struct SearchResponse {
    #[serde(rename="totalResults")]
    total_results: usize,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize,Debug)]
struct Feature {
    id: String,
}

/// parse a (GeoJSON formatted) OpenSearch response page
pub fn parse_search_response (data: &[u8])->Result<SearchResults> {
    let response: SearchResponse = serde_json::from_slice( data)?;
    Ok( SearchResults {
        total_results: response.total_results,
        ids: response.features.into_iter().map( |f| f.id).collect()
    })
}

pub fn format_api_datetime (dt: &DateTime<Utc>)->String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// human readable interval for log messages, e.g. `30 days, 0:00:00`
pub fn format_interval (interval: &TimeDelta)->String {
    let sign = if *interval < TimeDelta::zero() { "-" } else { "" };
    let secs = interval.num_seconds().abs();
    let (days, rem) = (secs / 86400, secs % 86400);
    format!("{sign}{days} days, {}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60)
}

pub struct EumetsatApi {
    client: Client,
    config: EumetsatConfig,
    credentials: Credentials,
    collection: EumetsatCollection,
    token: Mutex<Option<AccessToken>>,
    log_context: String,
}

impl EumetsatApi {
    pub fn new (config: EumetsatConfig, credentials: Credentials, collection: EumetsatCollection)->Result<Self> {
        let client = Client::builder().timeout( config.request_timeout).build()?;
        Ok( EumetsatApi { client, config, credentials, collection, token: Mutex::new(None), log_context: "EUMETSAT API".to_string() } )
    }

    /// config from `MONKEY_WRENCH_EUMETSAT_CONFIG` (or default), credentials from `EUMETSAT_API_LOGIN` and `EUMETSAT_API_PASSWORD`
    pub fn from_env (collection: EumetsatCollection)->Result<Self> {
        Self::new( load_config()?, Credentials::from_env()?, collection)
    }

    pub fn collection (&self)->EumetsatCollection { self.collection }

    pub fn config (&self)->&EumetsatConfig { &self.config }

    /// the cached token if it is still valid, a new one otherwise
    pub async fn token (&self)->Result<AccessToken> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter( |t| t.is_valid()) {
            return Ok( token.clone() )
        }

        let token = request_token( &self.client, &self.config, &self.credentials).await?;
        *cached = Some( token.clone());
        Ok(token)
    }

    fn log_message (&self, start: &DateTime<Utc>, end: &DateTime<Utc>, other: &str) {
        let space = if other.is_empty() || other.starts_with(':') { "" } else { " " };
        info!("{} -- Fetch period=['{}', '{}'){}{}", self.log_context, start, end, space, other);
    }

    /// OpenSearch query parameters. Results are sorted by descending sensing start time
    pub fn search_params (&self, start: &DateTime<Utc>, end: &DateTime<Utc>, polygon: Option<&Polygon>,
                          start_index: usize, count: usize)->Vec<(&'static str,String)> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("pi", self.collection.query_string().to_string()),
            ("dtstart", format_api_datetime( start)),
            ("dtend", format_api_datetime( end)),
            ("sort", "start,time,0".to_string()),
            ("si", start_index.to_string()),
            ("c", count.to_string()),
        ];
        if let Some(polygon) = polygon {
            params.push( ("geo", polygon.to_string()));
        }
        params
    }

    async fn search_page (&self, params: &[(&'static str,String)])->Result<SearchResults> {
        let token = self.token().await?;
        let response = self.client.get( &self.config.search_url)
            .bearer_auth( &token.value)
            .query( params)
            .send().await?;

        let status = response.status();
        if !status.is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err( EumetsatError::RequestFailed( status.as_u16(), msg))
        }

        parse_search_response( &response.bytes().await?)
    }

    /// the end is floored to the collection snapshots, which can make the period empty
    fn effective_period (&self, start: &DateTime<Utc>, end: &DateTime<Utc>)->Result<Option<(DateTime<Utc>,DateTime<Utc>)>> {
        assert_start_precedes_end( start, end)?;
        let end = floor_datetime_minutes_to_specific_snapshots( *end, self.collection.snapshot_minutes());
        Ok( if end < *start { None } else { Some((*start,end)) } )
    }

    /// number of products for the given period, without retrieving their IDs
    pub async fn count (&self, start: &DateTime<Utc>, end: &DateTime<Utc>, polygon: Option<&Polygon>)->Result<usize> {
        let Some((start,end)) = self.effective_period( start, end)? else { return Ok(0) };
        let page = self.search_page( &self.search_params( &start, &end, polygon, 0, 1)).await?;
        Ok( page.total_results )
    }

    /// all product IDs with `start <= sensing time < end` (and within `polygon` if given)
    pub async fn query (&self, start: &DateTime<Utc>, end: &DateTime<Utc>, polygon: Option<&Polygon>)->Result<SearchResults> {
        let Some((start,end)) = self.effective_period( start, end)? else { return Ok( SearchResults::default()) };

        let page_size = self.config.page_size.max(1);
        let mut results = SearchResults::default();
        loop {
            let page = self.search_page( &self.search_params( &start, &end, polygon, results.ids.len(), page_size)).await?;
            let n = page.ids.len();
            results.total_results = page.total_results;
            results.ids.extend( page.ids);

            if n == 0 || results.ids.len() >= results.total_results { break }
        }
        debug!("retrieved {} of {} products", results.ids.len(), results.total_results);

        Ok(results)
    }

    /// query the period in batches of `batch_interval` length, latest batch first. Each batch is handed to
    /// `process_batch` as soon as it is retrieved, so results of earlier batches survive a later failure.
    /// The sum of all batches is compared to the number of products the server reports for the whole period.
    /// Returns the total number of retrieved IDs
    pub async fn query_in_batches<F> (&self, start: &DateTime<Utc>, end: &DateTime<Utc>, batch_interval: TimeDelta,
                                      mut process_batch: F)->Result<usize>
        where F: FnMut(&SearchResults)->Result<()>
    {
        let expected_total_count = self.count( start, end, None).await?;
        self.log_message( start, end, &format!("and batch_interval='{}'.", format_interval( &batch_interval)));

        let mut total_retrieved_count = 0;
        for (s,e) in generate_datetime_batches( *start, *end, batch_interval, Order::Descending)? {
            self.log_message( &s, &e, "");
            let items = self.query( &s, &e, None).await?;
            total_retrieved_count += items.len();
            self.log_message( &s, &e, &format!(": retrieved {} items.", items.len()));
            process_batch( &items)?;
        }

        self.log_message( start, end, &format!(": retrieved {total_retrieved_count} items in total."));
        if expected_total_count != total_retrieved_count {
            warn!("Expected {expected_total_count} items but retrieved {total_retrieved_count}!");
        }

        Ok(total_retrieved_count)
    }

    pub fn product_url (&self, product_id: &str)->String {
        format!("{}/{}", make_collection_url( &self.config.download_url, self.collection), product_id)
    }

    /// download the product archive into `dir/<product_id>.zip`
    pub async fn download_product (&self, product_id: &str, dir: impl AsRef<Path>)->Result<PathBuf> {
        let path = dir.as_ref().join( format!("{product_id}.zip"));
        if path.is_file() {
            info!("product {product_id} already downloaded");
            return Ok(path)
        }

        let token = self.token().await?;
        let headers = Some( bearer_headers( &token.value)?);
        let url = self.product_url( product_id);
        info!("downloading {url}");

        download_url_with_retry( &self.client, &url, &headers, &path, self.config.max_retry, self.config.retry_delay).await?;
        Ok(path)
    }

    /// download a SEVIRI product and extract its native (`.nat`) file into `dir`. The archive is removed afterwards
    pub async fn fetch_seviri_native_file (&self, product_id: &str, dir: impl AsRef<Path>)->Result<PathBuf> {
        let dir = dir.as_ref();
        let archive = self.download_product( product_id, dir).await?;
        let nat_path = extract_native_file( &archive, dir)?;
        std::fs::remove_file( &archive)?;
        Ok(nat_path)
    }
}

/// extract the first `*.nat` member of a product archive into `dir`
pub fn extract_native_file (archive_path: impl AsRef<Path>, dir: impl AsRef<Path>)->Result<PathBuf> {
    let archive_path = archive_path.as_ref();
    let mut archive = ZipArchive::new( File::open( archive_path)?)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().ends_with(".nat") {
            let fname = Path::new( entry.name()).file_name()
                .ok_or_else( || op_failed( format!("invalid archive entry {}", entry.name())))?
                .to_os_string();
            let path = dir.as_ref().join( fname);
            let mut out = File::create( &path)?;
            io::copy( &mut entry, &mut out)?;
            return Ok(path)
        }
    }

    Err( op_failed( format!("no native file in {:?}", archive_path)))
}
