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

use thiserror::Error;

use mw_common::MwError;
use mw_eumetsat::EumetsatError;
use crate::validation::ValidationErrors;

pub type Result<T> = std::result::Result<T, TaskError>;

#[derive(Error,Debug)]
pub enum TaskError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("{0}")]
    CommonError( #[from] MwError),

    #[error("{0}")]
    EumetsatError( #[from] EumetsatError),

    #[error("YAML error {0}")]
    YamlError( #[from] serde_yaml::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("{0}")]
    ValidationErrors( #[from] ValidationErrors),

    #[error("{0}")]
    ValueError(String),

    #[error("operation failed {0}")]
    OpFailed(String)
}

pub fn value_error (msg: impl ToString)->TaskError {
    TaskError::ValueError(msg.to_string())
}

pub fn op_failed (msg: impl ToString)->TaskError {
    TaskError::OpFailed(msg.to_string())
}
