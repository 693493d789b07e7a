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

use std::fs;
use std::path::{Path, PathBuf};
use chrono::{TimeDelta, TimeZone, Utc};

use monkey_wrench::TaskError;
use monkey_wrench::cli::CommandLineArguments;
use monkey_wrench::task::*;
use monkey_wrench::task::chimp::Device;
use monkey_wrench::task::files::Reference;
use monkey_wrench::task::resampler::{Area, DEFAULT_RESAMPLER};
use monkey_wrench::validation::ValidationErrors;

// run with "cargo test --test test_task -- --nocapture"

fn touch (path: &Path, size: usize) {
    if let Some(dir) = path.parent() { fs::create_dir_all(dir).unwrap() }
    fs::write( path, vec![0u8; size]).unwrap();
}

fn validation_errors (res: monkey_wrench::Result<Vec<Task>>)->ValidationErrors {
    match res {
        Err(TaskError::ValidationErrors(errors)) => {
            for e in errors.iter() { println!("{e}") }
            errors
        }
        Err(e) => panic!("unexpected error {e}"),
        Ok(tasks) => panic!("unexpected success {tasks:?}")
    }
}

#[test]
fn test_ids_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!(r#"
context: ids
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime:
    datetime: [2022, 2, 1, 1]
    timezone: Europe/Stockholm
  batch_interval:
    days: 5
  output_filepath: '{}'
"#, dir.path().join("ids.txt").display());

    let tasks = parse_tasks( &yaml).unwrap();
    assert_eq!( tasks.len(), 1);
    assert_eq!( tasks[0].context(), Context::Ids);
    assert_eq!( tasks[0].action(), Action::Fetch);

    let Task::IdsFetch(specs) = &tasks[0] else { panic!("wrong task {:?}", tasks[0]) };
    assert_eq!( specs.start_datetime, Utc.with_ymd_and_hms( 2022, 1, 1, 0, 0, 0).unwrap());
    assert_eq!( specs.end_datetime, Utc.with_ymd_and_hms( 2022, 2, 1, 0, 0, 0).unwrap());
    assert_eq!( specs.batch_interval, TimeDelta::days(5));
}

#[test]
fn test_invalid_tasks() {
    let dir = tempfile::tempdir().unwrap();

    // unknown field
    let yaml = format!(r#"
context: ids
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  batch_interval: {{days: 1}}
  output_filepath: '{}'
  unexpected: 42
"#, dir.path().join("ids.txt").display());
    let errors = validation_errors( parse_tasks( &yaml));
    assert_eq!( errors.len(), 1);

    // unsupported context/action combination
    let errors = validation_errors( parse_tasks( "context: ids\naction: verify\nspecifications: {}\n"));
    assert_eq!( errors.len(), 1);
    assert_eq!( errors.iter().next().unwrap().loc.as_deref(), Some("action"));

    // unknown context
    let errors = validation_errors( parse_tasks( "context: foo\naction: fetch\nspecifications: {}\n"));
    assert_eq!( errors.len(), 1);

    // all value errors are collected: future end, start after end, zero interval, relative output path
    let yaml = r#"
context: ids
action: fetch
specifications:
  start_datetime: [2022, 1, 2]
  end_datetime: [2100, 1, 1]
  batch_interval: {days: 0}
  output_filepath: ids.txt
"#;
    let errors = validation_errors( parse_tasks( yaml));
    assert_eq!( errors.len(), 3);
    assert!( errors.iter().any( |e| e.loc.as_deref() == Some("specifications.end_datetime")));
    assert!( errors.iter().any( |e| e.loc.as_deref() == Some("specifications.output_filepath")));
    assert_eq!( errors.to_string(), "Found 3 validation error(s) in total.");

    let yaml = r#"
context: ids
action: fetch
specifications:
  start_datetime: [2022, 1, 2]
  end_datetime: [2022, 1, 1]
  batch_interval: {days: 1}
  output_filepath: /
"#;
    let errors = validation_errors( parse_tasks( yaml));
    assert_eq!( errors.len(), 2);
    assert!( errors.iter().any( |e| e.loc.is_none() && e.msg.contains("is later than")));

    // intervals beyond the representable range are rejected when parsing, not when running
    let yaml = format!(r#"
context: ids
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  batch_interval: {{weeks: 1000000000}}
  output_filepath: '{}'
"#, dir.path().join("ids.txt").display());
    let errors = validation_errors( parse_tasks( &yaml));
    assert_eq!( errors.len(), 1);
    assert!( errors.iter().next().unwrap().msg.contains("out of range"));
}

#[test]
fn test_validation_error_format() {
    use monkey_wrench::validation::ValidationError;

    let e = ValidationError::at( "specifications.input_directory", "foo", "Path must be absolute");
    assert_eq!( e.to_string(), "Path must be absolute -- 'foo' is not valid for assignment to 'specifications.input_directory'.");
    assert_eq!( ValidationError::new("oops").to_string(), "oops");
}

#[test]
fn test_multi_document() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.pt");
    touch( &model, 1);
    let ids = dir.path().join("ids.txt");
    touch( &ids, 0);

    let yaml = format!(r#"
context: files
action: verify
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  input_directory: '{d}'
  sub_strings: seviri
  nominal_size: 1000
  reference: ['MSG3-SEVI-MSG15-0100-NA-20220101001241.000000000Z-NA']
---
context: chimp
action: retrieve
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  input_directory: '{d}'
  model_filepath: '{m}'
  output_directory: '{d}'
  temp_directory: '{d}'
  device: cuda
---
context: files
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  number_of_processes: 4
  area:
    area_name: nordic
    projection: {{proj: stere}}
  input_filepath: '{i}'
  temp_directory: '{d}'
  output_directory: '{d}'
  cache: filecache
"#, d=dir.path().display(), m=model.display(), i=ids.display());

    let tasks = parse_tasks( &yaml).unwrap();
    assert_eq!( tasks.len(), 3);

    let Task::FilesVerify(verify) = &tasks[0] else { panic!("expected files.verify") };
    assert_eq!( verify.sub_strings, Some( vec!["seviri".to_string()]));
    assert!( verify.recursive);
    assert_eq!( verify.tolerance, 0.01);
    assert!( matches!( verify.reference, Some(Reference::Items(ref items)) if items.len() == 1));

    let Task::ChimpRetrieve(chimp) = &tasks[1] else { panic!("expected chimp.retrieve") };
    assert_eq!( chimp.device, Device::Cuda);
    assert_eq!( chimp.sequence_length, 16);
    assert_eq!( chimp.temporal_overlap, 0);
    assert_eq!( chimp.tile_size, 256);
    assert_eq!( chimp.verbose, 1);

    let Task::FilesFetch(fetch) = &tasks[2] else { panic!("expected files.fetch") };
    assert_eq!( fetch.number_of_processes, 4);
    assert_eq!( fetch.radius_of_influence, 20000);
    assert_eq!( fetch.resampler, DEFAULT_RESAMPLER);
    assert!( fetch.remove_file_if_exists);
    assert!( matches!( fetch.area, Area::Definition(_)));
}

#[test]
fn test_resampler_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let area = dir.path().join("areas.yaml");
    touch( &area, 1);
    let ids = dir.path().join("ids.txt");
    touch( &ids, 0);

    let yaml = format!(r#"
context: files
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  area: '{a}'
  resampler: my_resampler
  input_filepath: '{i}'
  temp_directory: '{d}'
  output_directory: '{d}'
"#, a=area.display(), i=ids.display(), d=dir.path().display());

    let tasks = parse_tasks( &yaml).unwrap();
    let Task::FilesFetch(fetch) = &tasks[0] else { panic!("expected files.fetch") };
    let resampler = fetch.resampler();
    assert_eq!( resampler.program, "my_resampler");

    let args = resampler.arguments( Path::new("/in/x.nat"), Path::new("/out/seviri_20220101_00_12.nc")).unwrap();
    assert_eq!( args[0], "--area");
    assert_eq!( args[1], area.display().to_string());
    assert_eq!( args[3], "20000");
    assert_eq!( args[5], r#"{"writer":"cf","include_lonlats":false}"#);
    assert_eq!( &args[6..], ["/in/x.nat", "/out/seviri_20220101_00_12.nc"]);
}

#[test]
fn test_area_without_name() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!(r#"
context: files
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  number_of_processes: 0
  area: {{projection: {{proj: stere}}}}
  input_filepath: '{d}/missing.txt'
  temp_directory: '{d}'
  output_directory: '{d}'
"#, d=dir.path().display());

    let errors = validation_errors( parse_tasks( &yaml));
    assert_eq!( errors.len(), 3); // processes, area name, input file
}

#[tokio::test]
async fn test_files_verify() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    touch( &data.join("2022/01/01/seviri_20220101_00_12.nc"), 1000);
    touch( &data.join("2022/01/01/seviri_20220101_00_27.nc"), 1005);
    touch( &data.join("2022/01/01/seviri_20220101_00_42.nc"), 500);
    touch( &data.join("2022/01/02/seviri_20220102_00_12.nc"), 1000);
    touch( &data.join("2022/01/01/notes.txt"), 10);

    let ids = dir.path().join("ids.txt");
    fs::write( &ids, "MSG3-SEVI-MSG15-0100-NA-20220101001241.000000000Z-NA\n\
                      MSG3-SEVI-MSG15-0100-NA-20220101002741.000000000Z-NA\n\
                      MSG3-SEVI-MSG15-0100-NA-20220101004241.000000000Z-NA\n\
                      MSG3-SEVI-MSG15-0100-NA-20220101005741.000000000Z-NA\n\
                      MSG3-SEVI-MSG15-0100-NA-20220103001241.000000000Z-NA\n").unwrap();

    let yaml = format!(r#"
context: files
action: verify
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  input_directory: '{data}'
  sub_strings: seviri
  nominal_size: 1000
  reference: '{ids}'
"#, data=data.display(), ids=ids.display());

    let tasks = parse_tasks( &yaml).unwrap();
    let results = tasks[0].perform().await.unwrap();
    println!("{}", format_results( &results));

    assert_eq!( results, vec![
        ("number of files found", 3),
        ("number of reference items", 4),
        ("number of missing files", 1),
        ("number of corrupted files", 1),
    ]);
}

/// input files at minutes 12, 27, 42 and 57 plus a CHIMP stand-in script. Returns the task YAML and the output dir
#[cfg(unix)]
fn chimp_retrieve_setup (dir: &Path, start: &str, end: &str)->(String,PathBuf,PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let input = dir.join("input");
    let output = dir.join("output");
    let temp = dir.join("temp");
    fs::create_dir_all( &output).unwrap();
    fs::create_dir_all( &temp).unwrap();
    for minute in [12, 27, 42, 57] {
        touch( &input.join( format!("seviri_20220101_00_{minute}.nc")), 10);
    }
    let model = dir.join("model.pt");
    touch( &model, 10);

    // writes the CHIMP output for the last input into the output dir (the argument before --device)
    let script = dir.join("fake_chimp.sh");
    fs::write( &script, r#"#!/bin/sh
last_input=""
out=""
for a in "$@"; do
  [ "$a" = "--device" ] && break
  last_input="$out"
  out="$a"
done
name=$(basename "$last_input" | sed 's/^seviri_/chimp_/')
touch "$out/$name"
touch "$out/unrelated.nc"
"#).unwrap();
    fs::set_permissions( &script, fs::Permissions::from_mode(0o755)).unwrap();

    let yaml = format!(r#"
context: chimp
action: retrieve
specifications:
  start_datetime: {start}
  end_datetime: {end}
  input_directory: '{input}'
  model_filepath: '{model}'
  output_directory: '{output}'
  temp_directory: '{temp}'
  sequence_length: 2
  chimp_program: '{script}'
"#, input=input.display(), model=model.display(), output=output.display(), temp=temp.display(), script=script.display());

    (yaml, output, temp)
}

#[cfg(unix)]
#[tokio::test]
async fn test_chimp_retrieve() {
    let dir = tempfile::tempdir().unwrap();
    let (yaml, output, temp) = chimp_retrieve_setup( dir.path(), "[2022, 1, 1, 0, 20]", "[2022, 1, 1, 1]");

    let tasks = parse_tasks( &yaml).unwrap();
    let results = tasks[0].perform().await.unwrap();
    assert_eq!( results, vec![("number of batches", 3), ("number of retrieved files", 3)]);

    let day = output.join("2022/01/01");
    for minute in [27, 42, 57] {
        assert!( day.join( format!("chimp_20220101_00_{minute}.nc")).is_file());
    }
    assert!( !day.join("chimp_20220101_00_12.nc").exists());
    assert!( !day.join("unrelated.nc").exists());
    assert_eq!( fs::read_dir( &temp).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_chimp_retrieve_first_window() {
    // only the very first input is in range, which is below sequence_length-1
    let dir = tempfile::tempdir().unwrap();
    let (yaml, output, _) = chimp_retrieve_setup( dir.path(), "[2022, 1, 1, 0, 10]", "[2022, 1, 1, 0, 15]");

    let tasks = parse_tasks( &yaml).unwrap();
    let results = tasks[0].perform().await.unwrap();
    assert_eq!( results, vec![("number of batches", 1), ("number of retrieved files", 1)]);
    assert!( output.join("2022/01/01/chimp_20220101_00_27.nc").is_file());
}

#[test]
fn test_cli_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let task_file = dir.path().join("task.yaml");
    touch( &task_file, 0);

    let args = CommandLineArguments { task_filepath: task_file.clone() };
    assert!( args.validate().is_ok());

    let args = CommandLineArguments { task_filepath: dir.path().join("task.txt") };
    assert_eq!( args.validate().unwrap_err().len(), 2);

    let res = read_tasks_from_file( dir.path().join("missing.yml"));
    assert!( matches!( res, Err(TaskError::ValidationErrors(_))));

    assert!( read_tasks_from_file( &task_file).unwrap().is_empty());
}
