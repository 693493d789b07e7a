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

//! OAuth2 client credential tokens for the EUMETSAT API

use std::fmt;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use mw_common::net::from_json;

use crate::{EumetsatConfig, EumetsatError, Result, credentials_error};

pub const LOGIN_ENV_VAR: &str = "EUMETSAT_API_LOGIN";
pub const PASSWORD_ENV_VAR: &str = "EUMETSAT_API_PASSWORD";

/// API key and secret (see https://api.eumetsat.int/api-key)
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "Credentials {{ login: {}, password: *** }}", mask_token( &self.login))
    }
}

impl Credentials {
    pub fn from_env ()->Result<Self> {
        Self::from_lookup( |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F> (lookup: F)->Result<Self> where F: Fn(&str)->Option<String> {
        let get = |name: &str| lookup(name).ok_or_else( || credentials_error( format!("Please set the environment variable '{name}'.")));
        Ok( Credentials { login: get( LOGIN_ENV_VAR)?, password: get( PASSWORD_ENV_VAR)? } )
    }
}

#[derive(Deserialize,Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub issued: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
}

impl AccessToken {
    /// we consider tokens that expire within the next minute as invalid
    pub fn is_valid (&self)->bool {
        Utc::now() + TimeDelta::seconds(60) < self.expiration
    }

    pub fn masked (&self)->String {
        mask_token( &self.value)
    }
}

impl fmt::Display for AccessToken {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{}", self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "AccessToken {{ value: {}, issued: {}, expiration: {} }}", self.masked(), self.issued, self.expiration)
    }
}

/// only show first and last three chars, e.g. `abc ... xyz`
pub fn mask_token (s: &str)->String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 6 {
        "***".to_string()
    } else {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len()-3..].iter().collect();
        format!("{head} ... {tail}")
    }
}

pub async fn request_token (client: &Client, config: &EumetsatConfig, credentials: &Credentials)->Result<AccessToken> {
    let response = client.post( &config.token_url)
        .basic_auth( &credentials.login, Some( &credentials.password))
        .form( &[("grant_type", "client_credentials")])
        .timeout( config.request_timeout)
        .send().await?;

    let status = response.status();
    if !status.is_success() {
        let msg = response.text().await.unwrap_or_default();
        return Err( EumetsatError::RequestFailed( status.as_u16(), format!("token request rejected: {msg}")))
    }

    let tr: TokenResponse = from_json( response).await?;
    let issued = Utc::now();
    let token = AccessToken { value: tr.access_token, issued, expiration: issued + TimeDelta::seconds( tr.expires_in) };

    info!("Accessing token '{}' issued at {} and expires {}.", token.masked(), token.issued, token.expiration);
    Ok(token)
}
