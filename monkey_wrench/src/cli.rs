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

use std::path::PathBuf;
use clap::Parser;

use crate::errors::{Result, TaskError};
use crate::task::read_tasks_from_file;
use crate::validation::ValidationErrors;

#[derive(Parser,Debug)]
#[command(version, about, long_about = "perform all tasks of a YAML task file")]
pub struct CommandLineArguments {
    /// path of the task file, must end in '.yaml' or '.yml'
    pub task_filepath: PathBuf,
}

impl CommandLineArguments {
    pub fn validate (&self)->std::result::Result<(),ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let path = &self.task_filepath;

        if !path.extension().is_some_and( |ext| ext == "yaml" || ext == "yml") {
            errors.add( "task_filepath", path.display(), "Task file must have a '.yaml' or '.yml' extension");
        }
        if !path.is_file() {
            errors.add( "task_filepath", path.display(), "Path does not point to a file");
        }
        errors.into_result()
    }
}

/// perform all tasks of the task file in order. Validation errors are logged before they are returned
pub async fn run (args: &CommandLineArguments)->Result<()> {
    let result = perform_tasks( args).await;
    if let Err(TaskError::ValidationErrors(errors)) = &result {
        errors.log();
    }
    result
}

async fn perform_tasks (args: &CommandLineArguments)->Result<()> {
    args.validate()?;
    for task in read_tasks_from_file( &args.task_filepath)? {
        task.perform().await?;
    }
    Ok(())
}
