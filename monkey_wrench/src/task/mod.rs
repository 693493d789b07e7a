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

//! declarative tasks read from YAML task files. Each YAML document is one task given by its `context`,
//! `action` and `specifications`

use std::fmt;
use std::fs;
use std::path::Path;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use strum::{Display, EnumString};
use tracing::info;
use uuid::Uuid;

use crate::errors::{Result, TaskError};
use crate::validation::{Validate, ValidationError, ValidationErrors};

pub mod ids;
pub mod files;
pub mod chimp;
pub mod resampler;

/// named counts reported by a task
pub type TaskResults = Vec<(&'static str, usize)>;

pub(crate) fn default_true()->bool { true }
pub(crate) fn default_tolerance()->f64 { 0.01 }
pub(crate) fn default_processes()->usize { 2 }

#[derive(Debug,Clone,Copy,PartialEq,Eq,Deserialize,Display,EnumString)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase")]
pub enum Context {
    Ids,
    Files,
    Chimp,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Deserialize,Display,EnumString)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase")]
pub enum Action {
    Fetch,
    Verify,
    Retrieve,
}

#[derive(Debug,Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTask {
    context: Context,
    action: Action,
    specifications: Value,
}

#[derive(Debug,Clone)]
pub enum Task {
    IdsFetch(ids::FetchSpecifications),
    FilesVerify(files::VerifySpecifications),
    FilesFetch(files::FetchSpecifications),
    ChimpRetrieve(chimp::RetrieveSpecifications),
}

fn specifications<S> (value: Value)->std::result::Result<S,ValidationErrors> where S: DeserializeOwned + Validate {
    let loc = "specifications";
    let specs: S = serde_yaml::from_value( value).map_err( |e| ValidationError::new( format!("{loc}: {e}")))?;
    specs.validated( loc)
}

impl Task {
    /// deserialize and validate a single task document
    pub fn from_value (value: Value)->std::result::Result<Task,ValidationErrors> {
        let raw: RawTask = serde_yaml::from_value( value).map_err( |e| ValidationError::new( e))?;

        match (raw.context, raw.action) {
            (Context::Ids, Action::Fetch) => Ok( Task::IdsFetch( specifications( raw.specifications)?)),
            (Context::Files, Action::Verify) => Ok( Task::FilesVerify( specifications( raw.specifications)?)),
            (Context::Files, Action::Fetch) => Ok( Task::FilesFetch( specifications( raw.specifications)?)),
            (Context::Chimp, Action::Retrieve) => Ok( Task::ChimpRetrieve( specifications( raw.specifications)?)),
            (context, action) => {
                Err( ValidationError::at( "action", action, format!("Action is not supported for context '{context}'")).into())
            }
        }
    }

    pub fn context (&self)->Context {
        match self {
            Task::IdsFetch(_) => Context::Ids,
            Task::FilesVerify(_) | Task::FilesFetch(_) => Context::Files,
            Task::ChimpRetrieve(_) => Context::Chimp,
        }
    }

    pub fn action (&self)->Action {
        match self {
            Task::IdsFetch(_) | Task::FilesFetch(_) => Action::Fetch,
            Task::FilesVerify(_) => Action::Verify,
            Task::ChimpRetrieve(_) => Action::Retrieve,
        }
    }

    fn specifications_debug (&self)->String {
        match self {
            Task::IdsFetch(s) => format!("{s:?}"),
            Task::FilesVerify(s) => format!("{s:?}"),
            Task::FilesFetch(s) => format!("{s:?}"),
            Task::ChimpRetrieve(s) => format!("{s:?}"),
        }
    }

    /// run the task. Log messages of the same task share a unique ID
    pub async fn perform (&self)->Result<TaskResults> {
        let log_id = Uuid::new_v4();
        info!("Performing task '{}.{}' with specifications '{}' -- ID: {}.", self.context(), self.action(), self.specifications_debug(), log_id);

        let results = match self {
            Task::IdsFetch(specs) => ids::fetch( specs).await?,
            Task::FilesVerify(specs) => files::verify( specs)?,
            Task::FilesFetch(specs) => files::fetch( specs).await?,
            Task::ChimpRetrieve(specs) => chimp::retrieve( specs).await?,
        };

        if !results.is_empty() {
            info!("Retrieved results for task: {} -- ID: {}.", format_results( &results), log_id);
        }
        Ok(results)
    }
}

/// e.g. `{'number of files found': 3, 'number of missing files': 0}`
pub fn format_results (results: &[(&str, usize)])->String {
    let entries: Vec<String> = results.iter().map( |(k,v)| format!("'{k}': {v}")).collect();
    format!("{{{}}}", entries.join(", "))
}

/// parse all tasks of a (multi document) YAML string. Validation errors of all documents are reported together
pub fn parse_tasks (data: &str)->Result<Vec<Task>> {
    let mut tasks = Vec::new();
    let mut errors = ValidationErrors::new();

    for document in serde_yaml::Deserializer::from_str( data) {
        match Value::deserialize( document) {
            Ok(Value::Null) => {}
            Ok(value) => match Task::from_value( value) {
                Ok(task) => tasks.push( task),
                Err(e) => errors.extend( e)
            }
            Err(e) => {
                errors.push( ValidationError::new( e));
                break
            }
        }
    }

    errors.into_result()?;
    Ok(tasks)
}

pub fn read_tasks_from_file (path: impl AsRef<Path>)->Result<Vec<Task>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( ValidationErrors::from( ValidationError::at( "task_filepath", path.display(), "Path does not point to a file")).into())
    }

    let data = fs::read_to_string( path)?;
    parse_tasks( &data)
}
