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

//! bounded worker pool for async jobs and execution of external programs

use std::ffi::OsStr;
use std::future::Future;
use futures::stream::{self, StreamExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Result, command_error};

/// run `f` for all items with at most `number_of_processes` concurrent executions. Results are returned in the
/// order of the input items
pub async fn run_multiple<I,T,F,Fut,R> (items: I, number_of_processes: usize, f: F)->Vec<R>
    where I: IntoIterator<Item=T>, F: Fn(T)->Fut, Fut: Future<Output=R>
{
    stream::iter(items)
        .map(f)
        .buffered( number_of_processes.max(1))
        .collect()
        .await
}

/// run an external program and wait for it to terminate. Non-zero exit codes are errors that include stderr
pub async fn run_command<S: AsRef<OsStr>> (program: &str, args: &[S])->Result<()> {
    let cmdline: Vec<String> = args.iter().map( |a| a.as_ref().to_string_lossy().to_string()).collect();
    info!("running {} {}", program, cmdline.join(" "));

    let output = Command::new( program)
        .args( args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err( |e| command_error( format!("cannot execute {program}: {e}")))?;

    if !output.stdout.is_empty() {
        debug!("{program}: {}", String::from_utf8_lossy( &output.stdout).trim());
    }

    if output.status.success() {
        Ok(())
    } else {
        Err( command_error( format!("{program} terminated with {}: {}", output.status, String::from_utf8_lossy( &output.stderr).trim())))
    }
}
