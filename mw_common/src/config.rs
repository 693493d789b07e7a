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

//! RON configuration files

use std::path::Path;
use serde::de::DeserializeOwned;

use crate::errors::Result;

pub fn load_config_path<C,P> (path: P)->Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let data = std::fs::read_to_string( path.as_ref())?;
    Ok( ron::from_str( &data)? )
}

/// load config from the file named by env var `var` if it is set, otherwise use the default
pub fn load_config_from_env_or_default<C> (var: &str)->Result<C> where C: DeserializeOwned + Default {
    match std::env::var(var) {
        Ok(path) => load_config_path( path),
        Err(_) => Ok( C::default() )
    }
}
