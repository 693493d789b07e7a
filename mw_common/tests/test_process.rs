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
#![allow(unused)]

use std::time::Duration;
use mw_common::process::{run_command, run_multiple};
use mw_common::MwError;

// run with "cargo test --test test_process -- --nocapture"

#[tokio::test]
async fn test_run_multiple_keeps_order() {
    let results = run_multiple( 1..=8u64, 3, |i| async move {
        // later items finish first
        tokio::time::sleep( Duration::from_millis( 80 - i*10)).await;
        i * 2
    }).await;

    assert_eq!( results, vec![2,4,6,8,10,12,14,16]);
}

#[tokio::test]
async fn test_run_multiple_zero_processes() {
    let results = run_multiple( vec!["a","b"], 0, |s| async move { s.len() }).await;
    assert_eq!( results, vec![1,1]);
}

#[tokio::test]
async fn test_run_command() {
    assert!( run_command( "true", &[] as &[&str]).await.is_ok());

    match run_command( "false", &[] as &[&str]).await {
        Err(MwError::CommandError(msg)) => println!("expected failure: {msg}"),
        other => panic!("unexpected result {other:?}")
    }

    assert!( run_command( "no_such_program_here", &["x"]).await.is_err());
}

