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

//! client for the EUMETSAT Datastore: access tokens, product searches (single and in batches), product
//! downloads, and the CHIMP/SEVIRI file naming that goes along with the retrieved products

use std::time::Duration;
use serde::{Deserialize, Serialize};

use mw_common::datetime::{secs, deserialize_duration, serialize_duration};
use mw_common::config::load_config_from_env_or_default;

mod errors;
pub use errors::*;

pub mod collection;
pub use collection::*;

pub mod token;
pub use token::*;

pub mod api;
pub use api::*;

pub mod seviri;

/// env var that can point to a RON file with an `EumetsatConfig`
pub const CONFIG_ENV_VAR: &str = "MONKEY_WRENCH_EUMETSAT_CONFIG";

/// EUMETSAT Datastore endpoints and request parameters
#[derive(Clone,Serialize,Deserialize,Debug,PartialEq)]
pub struct EumetsatConfig {
    /// where to obtain access tokens (OAuth2 client credentials)
    pub token_url: String,

    /// OpenSearch product search endpoint
    pub search_url: String,

    /// base URL for product downloads, collection and product IDs get appended
    pub download_url: String,

    /// max number of product IDs per search request
    pub page_size: usize,

    /// delay between failed download attempts
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub retry_delay: Duration,

    /// max retry attempts
    pub max_retry: u8,

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub request_timeout: Duration,
}

impl Default for EumetsatConfig {
    fn default() -> Self {
        Self {
            token_url: "https://api.eumetsat.int/token".to_string(),
            search_url: "https://api.eumetsat.int/data/search-products/1.0.0/os".to_string(),
            download_url: "https://api.eumetsat.int/data/download/1.0.0/collections".to_string(),
            page_size: 500,
            retry_delay: secs(30),
            max_retry: 4,
            request_timeout: secs(300),
        }
    }
}

/// config from the file named by `MONKEY_WRENCH_EUMETSAT_CONFIG`, or the default config if that is not set
pub fn load_config ()->Result<EumetsatConfig> {
    Ok( load_config_from_env_or_default( CONFIG_ENV_VAR)? )
}
