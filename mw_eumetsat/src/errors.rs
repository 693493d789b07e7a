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

pub type Result<T> = std::result::Result<T, EumetsatError>;

#[derive(Error,Debug)]
pub enum EumetsatError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("zip archive error {0}")]
    ZipError( #[from] zip::result::ZipError),

    #[error("{0}")]
    CommonError( #[from] mw_common::MwError),

    /// missing or rejected API credentials
    #[error("{0}")]
    CredentialsError(String),

    #[error("request failed with status {0}: {1}")]
    RequestFailed(u16, String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

pub fn op_failed (msg: impl ToString)->EumetsatError {
    EumetsatError::OpFailed(msg.to_string())
}

pub fn credentials_error (msg: impl ToString)->EumetsatError {
    EumetsatError::CredentialsError(msg.to_string())
}
