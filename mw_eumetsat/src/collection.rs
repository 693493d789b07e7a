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

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Datastore collections we know how to query
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize,Display,EnumString)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase")]
pub enum EumetsatCollection {
    Amsu,
    Avhrr,
    Mhs,
    Seviri,
}

impl EumetsatCollection {
    /// colon delimited collection ID
    pub fn query_string (&self)->&'static str {
        match self {
            EumetsatCollection::Amsu => "EO:EUM:DAT:METOP:AMSUL1",
            EumetsatCollection::Avhrr => "EO:EUM:DAT:METOP:AVHRRL1",
            EumetsatCollection::Mhs => "EO:EUM:DAT:METOP:MHSL1",
            EumetsatCollection::Seviri => "EO:EUM:DAT:MSG:HRSEVIRI",
        }
    }

    /// minutes of the hour for which the collection has products (one SEVIRI scan every 15 min starting at :12)
    pub fn snapshot_minutes (&self)->&'static [u32] {
        match self {
            EumetsatCollection::Seviri => &[12, 27, 42, 57],
            _ => &[]
        }
    }
}

/// e.g. `https://api.eumetsat.int/data/download/1.0.0/collections/EO%3AEUM%3ADAT%3AMSG%3AHRSEVIRI/products`
pub fn make_collection_url (download_url: &str, collection: EumetsatCollection)->String {
    format!("{}/{}/products", download_url.trim_end_matches('/'), collection.query_string().replace(':', "%3A"))
}
