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

//! common utility functions for network operations

use std::{io::Write, path::Path, time::Duration};
use reqwest::{header::{HeaderMap, HeaderValue, AUTHORIZATION}, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::errors::{MwError, Result, op_failed};

pub fn bearer_headers (token: &str)->Result<HeaderMap> {
    let mut hm = HeaderMap::new();
    let value = HeaderValue::from_str( &format!("Bearer {token}")).map_err( |e| op_failed( e.to_string()))?;
    hm.insert( AUTHORIZATION, value);
    Ok(hm)
}

/// fetch `url` in chunks into a temp file next to `path`, which is only renamed into `path` once the download
/// is complete (so that partial downloads are never visible). Returns the number of bytes
pub async fn download_url (client: &Client, url: &str, opt_headers: &Option<HeaderMap>, path: impl AsRef<Path>)->Result<u64> {
    let path = path.as_ref();
    let dir = path.parent().filter( |p| !p.as_os_str().is_empty()).unwrap_or( Path::new("."));

    let mut req = client.get(url);
    if let Some(headermap) = &opt_headers {
        req = req.headers( headermap.clone())
    }

    let mut response = req.send().await?;

    match response.status() {
        StatusCode::OK => {
            let mut file = tempfile::NamedTempFile::new_in( dir)?;
            let mut len: u64 = 0;
            while let Some(chunk) = response.chunk().await? {
                len += chunk.len() as u64;
                file.write_all( &chunk)?;
            }
            file.flush()?;

            if len > 0 {
                file.persist( path).map_err( |e| e.error)?;
                info!("{} kB saved to {:?}", len / 1024, path);
                Ok(len)
            } else {
                Err( op_failed( format!("empty response from {url}")))
            }
        }
        StatusCode::NOT_FOUND => {
            Err( MwError::NotFoundError( url.to_string()))
        }
        other => {
            Err( op_failed( format!("response status {other:?} for {url}")))
        }
    }
}

/// retry failed downloads up to `max_retry` times. Missing resources are not retried
pub async fn download_url_with_retry (client: &Client, url: &str, opt_headers: &Option<HeaderMap>, path: impl AsRef<Path>,
                                      max_retry: u8, retry_delay: Duration)->Result<u64> {
    let path = path.as_ref();
    let mut retry = 0;
    loop {
        match download_url( client, url, opt_headers, path).await {
            Ok(len) => return Ok(len),
            Err(e @ MwError::NotFoundError(_)) => return Err(e),
            Err(e) => {
                if retry < max_retry {
                    retry += 1;
                    warn!("download of {url} failed: {e}, retry {}/{} in {} sec", retry, max_retry, retry_delay.as_secs());
                    tokio::time::sleep( retry_delay).await;
                } else {
                    return Err(e)
                }
            }
        }
    }
}

pub async fn from_json<T> (response: Response)->Result<T> where T: DeserializeOwned {
    let bytes = response.bytes().await?;
    Ok( serde_json::from_slice( &bytes)? )
}
