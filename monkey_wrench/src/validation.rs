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

//! input validation of task specifications. Validation does not stop at the first problem, all errors of a task
//! file are collected and reported together

use std::fmt::{self, Display};
use std::path::Path;
use chrono::{DateTime, Utc};
use tracing::error;

use mw_common::datetime::assert_start_precedes_end;

#[derive(Debug,Clone,PartialEq)]
pub struct ValidationError {
    /// dot separated location of the offending input, e.g. `specifications.input_directory`
    pub loc: Option<String>,
    pub input: Option<String>,
    pub msg: String,
}

impl ValidationError {
    pub fn new (msg: impl ToString)->Self {
        ValidationError { loc: None, input: None, msg: msg.to_string() }
    }

    pub fn at (loc: impl ToString, input: impl Display, msg: impl ToString)->Self {
        ValidationError { loc: Some(loc.to_string()), input: Some(input.to_string()), msg: msg.to_string() }
    }
}

impl Display for ValidationError {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match &self.loc {
            Some(loc) => write!( f, "{} -- '{}' is not valid for assignment to '{}'.", self.msg, self.input.as_deref().unwrap_or(""), loc),
            None => write!( f, "{}", self.msg)
        }
    }
}

#[derive(Debug,Clone,Default,PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>
}

impl ValidationErrors {
    pub fn new ()->Self { ValidationErrors::default() }

    pub fn push (&mut self, e: ValidationError) { self.errors.push(e) }

    pub fn add (&mut self, loc: impl ToString, input: impl Display, msg: impl ToString) {
        self.errors.push( ValidationError::at( loc, input, msg))
    }

    pub fn extend (&mut self, other: ValidationErrors) { self.errors.extend( other.errors) }

    pub fn len (&self)->usize { self.errors.len() }

    pub fn is_empty (&self)->bool { self.errors.is_empty() }

    pub fn iter (&self)->impl Iterator<Item=&ValidationError> { self.errors.iter() }

    /// Ok if there are no errors
    pub fn into_result (self)->Result<(),ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn log (&self) {
        error!("{}", self);
        for (i,e) in self.errors.iter().enumerate() {
            error!("Validation error {} -- {}", i+1, e);
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from (e: ValidationError)->Self {
        ValidationErrors { errors: vec![e] }
    }
}

impl Display for ValidationErrors {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "Found {} validation error(s) in total.", self.errors.len())
    }
}

impl std::error::Error for ValidationErrors {}

/// task specifications that can check their (deserialized) values
pub trait Validate {
    /// add all problems found under the location prefix `loc`
    fn validate (&self, loc: &str, errors: &mut ValidationErrors);

    fn validated (self, loc: &str)->Result<Self,ValidationErrors> where Self: Sized {
        let mut errors = ValidationErrors::new();
        self.validate( loc, &mut errors);
        errors.into_result().map( |_| self)
    }
}

pub fn field (loc: &str, name: &str)->String {
    if loc.is_empty() { name.to_string() } else { format!("{loc}.{name}") }
}

/* #region checks ********************************************************************************************/

pub fn check_past (errors: &mut ValidationErrors, loc: String, dt: &DateTime<Utc>) {
    if *dt > Utc::now() {
        errors.add( loc, dt, "Input should be in the past");
    }
}

/// both datetimes have to be in the past and the start must not be after the end
pub fn check_period (errors: &mut ValidationErrors, loc: &str, start: &DateTime<Utc>, end: &DateTime<Utc>) {
    check_past( errors, field( loc, "start_datetime"), start);
    check_past( errors, field( loc, "end_datetime"), end);
    if let Err(e) = assert_start_precedes_end( start, end) {
        errors.push( ValidationError::new( e));
    }
}

pub fn check_absolute (errors: &mut ValidationErrors, loc: String, path: &Path)->bool {
    if path.is_absolute() {
        true
    } else {
        errors.add( loc, path.display(), "Path must be absolute");
        false
    }
}

pub fn check_existing_file (errors: &mut ValidationErrors, loc: String, path: &Path) {
    if check_absolute( errors, loc.clone(), path) && !path.is_file() {
        errors.add( loc, path.display(), "Path does not point to a file");
    }
}

pub fn check_existing_dir (errors: &mut ValidationErrors, loc: String, path: &Path) {
    if check_absolute( errors, loc.clone(), path) && !path.is_dir() {
        errors.add( loc, path.display(), "Path does not point to a directory");
    }
}

/// output files can be new or existing, but their parent directory has to exist
pub fn check_output_file (errors: &mut ValidationErrors, loc: String, path: &Path) {
    if check_absolute( errors, loc.clone(), path) {
        if path.is_dir() {
            errors.add( loc, path.display(), "Path points to a directory");
        } else if !path.parent().is_some_and( |p| p.is_dir()) {
            errors.add( loc, path.display(), "Parent directory of the path does not exist");
        }
    }
}

pub fn check_positive (errors: &mut ValidationErrors, loc: String, value: usize) {
    if value == 0 {
        errors.add( loc, value, "Input should be greater than 0");
    }
}

/* #endregion checks */
