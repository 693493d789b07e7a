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

use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::{ZipWriter, write::SimpleFileOptions};

use mw_common::fs::{DateTimeDirectory, read_items};
use mw_eumetsat::{Credentials, EumetsatApi, EumetsatCollection, EumetsatConfig};
use monkey_wrench::task::*;
use monkey_wrench::task::files::resample_native_file;
use monkey_wrench::task::resampler::{Area, Resampler, default_dataset_save_options};

// run with "cargo test --test test_fetch -- --nocapture"

const ID_0012: &str = "MSG4-SEVI-MSG15-0100-NA-20220101001242.000000000Z-NA";
const ID_0027: &str = "MSG4-SEVI-MSG15-0100-NA-20220101002742.000000000Z-NA";
const ID_0042: &str = "MSG4-SEVI-MSG15-0100-NA-20220101004242.000000000Z-NA";

fn touch (path: &Path, size: usize) {
    if let Some(dir) = path.parent() { fs::create_dir_all(dir).unwrap() }
    fs::write( path, vec![0u8; size]).unwrap();
}

async fn mock_api (server: &MockServer)->EumetsatApi {
    Mock::given( method("POST"))
        .and( path("/token"))
        .respond_with( ResponseTemplate::new(200).set_body_json( json!({"access_token": "abcdefghijkl", "expires_in": 3600})))
        .mount( server)
        .await;

    let config = EumetsatConfig {
        token_url: format!("{}/token", server.uri()),
        search_url: format!("{}/search", server.uri()),
        download_url: format!("{}/download", server.uri()),
        page_size: 500,
        retry_delay: Duration::ZERO,
        max_retry: 0,
        request_timeout: Duration::from_secs(10),
    };
    let credentials = Credentials { login: "someone".to_string(), password: "secret".to_string() };
    EumetsatApi::new( config, credentials, EumetsatCollection::Seviri).unwrap()
}

fn search_response (total: usize, ids: &[&str])->ResponseTemplate {
    let features: Vec<_> = ids.iter().map( |id| json!({"id": id})).collect();
    ResponseTemplate::new(200).set_body_json( json!({"totalResults": total, "features": features}))
}

/// a 2 day period in 1 day batches. The count request and the newer batch always succeed
async fn mount_search (server: &MockServer, older_batch: ResponseTemplate) {
    Mock::given( method("GET"))
        .and( path("/search"))
        .and( query_param("dtstart", "2022-01-01T00:00:00.000Z"))
        .and( query_param("c", "1"))
        .respond_with( search_response( 3, &["b1"]))
        .mount( server)
        .await;

    Mock::given( method("GET"))
        .and( path("/search"))
        .and( query_param("dtstart", "2022-01-02T00:00:00.000Z"))
        .and( query_param("dtend", "2022-01-02T23:57:00.000Z"))
        .and( query_param("c", "500"))
        .respond_with( search_response( 2, &["b1", "b2"]))
        .mount( server)
        .await;

    Mock::given( method("GET"))
        .and( path("/search"))
        .and( query_param("dtstart", "2022-01-01T00:00:00.000Z"))
        .and( query_param("dtend", "2022-01-01T23:57:00.000Z"))
        .and( query_param("c", "500"))
        .respond_with( older_batch)
        .mount( server)
        .await;
}

fn ids_fetch_specs (output: &Path)->ids::FetchSpecifications {
    let yaml = format!(r#"
context: ids
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 3]
  batch_interval: {{days: 1}}
  output_filepath: '{}'
"#, output.display());

    match parse_tasks( &yaml).unwrap().remove(0) {
        Task::IdsFetch(specs) => specs,
        other => panic!("wrong task {other:?}")
    }
}

#[tokio::test]
async fn test_ids_fetch_writes_all_batches() {
    let server = MockServer::start().await;
    let api = mock_api( &server).await;
    mount_search( &server, search_response( 1, &["a1"])).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ids.txt");
    fs::write( &output, "stale\n").unwrap();

    let results = ids::fetch_with( &api, &ids_fetch_specs( &output)).await.unwrap();
    assert_eq!( results, vec![("number of items successfully fetched and written to the file", 3)]);
    assert_eq!( read_items( &output, true).unwrap(), vec!["b1", "b2", "a1"]);
}

#[tokio::test]
async fn test_ids_fetch_keeps_batches_before_failure() {
    let server = MockServer::start().await;
    let api = mock_api( &server).await;
    mount_search( &server, ResponseTemplate::new(500).set_body_string("internal error")).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ids.txt");

    let err = ids::fetch_with( &api, &ids_fetch_specs( &output)).await.unwrap_err();
    println!("expected failure: {err}");
    assert!( err.to_string().contains("500"));

    // the newer batch was written before the older one failed
    assert_eq!( read_items( &output, true).unwrap(), vec!["b1", "b2"]);
}

/* #region resampling *****************************************************************************************/

/// stand-in resampler that logs its arguments and writes its last argument (the output file), or fails if `fail` is set
#[cfg(unix)]
fn resampler_script (dir: &Path, fail: bool)->PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join( if fail { "failing_resample.sh" } else { "resample.sh" });
    let body = if fail {
        "#!/bin/sh\necho 'cannot read input' >&2\nexit 1\n".to_string()
    } else {
        r#"#!/bin/sh
for a in "$@"; do out="$a"; done
echo "$@" >> "$(dirname "$0")/runs.txt"
echo resampled > "$out"
"#.to_string()
    };
    fs::write( &script, body).unwrap();
    fs::set_permissions( &script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn resampler (program: &Path, remove_file_if_exists: bool)->Resampler {
    Resampler {
        program: program.display().to_string(),
        area: Area::Definition( serde_yaml::from_str("area_name: test_area").unwrap()),
        radius_of_influence: 20000,
        remove_file_if_exists,
        dataset_save_options: default_dataset_save_options(),
    }
}

fn runs (dir: &Path)->Vec<String> {
    read_items( dir.join("runs.txt"), true).unwrap_or_default()
}

#[cfg(unix)]
#[tokio::test]
async fn test_resample_native_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = resampler_script( dir.path(), false);
    let datetime_dir = DateTimeDirectory::new( dir.path().join("output"));
    datetime_dir.create( &Utc.with_ymd_and_hms( 2022, 1, 1, 0, 12, 0).unwrap(), false).unwrap();
    let native_file = dir.path().join("temp").join( format!("{ID_0012}.nat"));
    let expected = dir.path().join("output/2022/01/01/seviri_20220101_00_12.nc");

    touch( &native_file, 10);
    let path = resample_native_file( &resampler( &script, false), &datetime_dir, ID_0012, &native_file).await.unwrap();
    assert_eq!( path, expected);
    assert_eq!( fs::read_to_string( &path).unwrap().trim(), "resampled");
    assert!( !native_file.exists());

    let args = runs( dir.path());
    assert_eq!( args.len(), 1);
    assert!( args[0].contains("--radius-of-influence 20000"));
    assert!( args[0].contains("area_name"));

    // existing output is kept and resampling skipped
    fs::write( &expected, "previous").unwrap();
    touch( &native_file, 10);
    resample_native_file( &resampler( &script, false), &datetime_dir, ID_0012, &native_file).await.unwrap();
    assert_eq!( fs::read_to_string( &expected).unwrap(), "previous");
    assert_eq!( runs( dir.path()).len(), 1);
    assert!( !native_file.exists());

    // existing output is removed and resampled again
    touch( &native_file, 10);
    resample_native_file( &resampler( &script, true), &datetime_dir, ID_0012, &native_file).await.unwrap();
    assert_eq!( fs::read_to_string( &expected).unwrap().trim(), "resampled");
    assert_eq!( runs( dir.path()).len(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_resample_native_file_failure() {
    let dir = tempfile::tempdir().unwrap();
    let script = resampler_script( dir.path(), true);
    let datetime_dir = DateTimeDirectory::new( dir.path().join("output"));
    let native_file = dir.path().join( format!("{ID_0012}.nat"));
    touch( &native_file, 10);

    let err = resample_native_file( &resampler( &script, true), &datetime_dir, ID_0012, &native_file).await.unwrap_err();
    println!("expected failure: {err}");
    assert!( err.to_string().contains("cannot read input"));
    assert!( !native_file.exists());
}

/* #endregion resampling */

fn product_archive (entries: &[(&str, &[u8])])->Vec<u8> {
    let mut zip = ZipWriter::new( Cursor::new( Vec::new()));
    for (name, data) in entries {
        zip.start_file( *name, SimpleFileOptions::default()).unwrap();
        zip.write_all( data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

async fn mount_product (server: &MockServer, product_id: &str, response: ResponseTemplate) {
    Mock::given( method("GET"))
        .and( path_regex( format!("/download/.+/products/{product_id}$")))
        .respond_with( response)
        .expect(1)
        .mount( server)
        .await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_files_fetch_counts_failures() {
    let server = MockServer::start().await;
    let api = mock_api( &server).await;

    let native_name = format!("{ID_0012}.nat");
    let valid = product_archive( &[ ("EOPMetadata.xml", b"<xml/>".as_slice()), (native_name.as_str(), b"native data".as_slice()) ]);
    mount_product( &server, ID_0012, ResponseTemplate::new(200).set_body_bytes( valid)).await;
    mount_product( &server, ID_0027, ResponseTemplate::new(404)).await;
    let no_native = product_archive( &[ ("EOPMetadata.xml", b"<xml/>".as_slice()) ]);
    mount_product( &server, ID_0042, ResponseTemplate::new(200).set_body_bytes( no_native)).await;

    let dir = tempfile::tempdir().unwrap();
    let script = resampler_script( dir.path(), false);
    let input = dir.path().join("ids.txt");
    // the last ID is outside of the fetch period
    fs::write( &input, format!("{ID_0012}\n{ID_0027}\n{ID_0042}\nMSG4-SEVI-MSG15-0100-NA-20220102001242.000000000Z-NA\n")).unwrap();
    let temp = dir.path().join("temp");
    let output = dir.path().join("output");
    fs::create_dir_all( &temp).unwrap();
    fs::create_dir_all( &output).unwrap();

    let yaml = format!(r#"
context: files
action: fetch
specifications:
  start_datetime: [2022, 1, 1]
  end_datetime: [2022, 1, 2]
  number_of_processes: 2
  area: {{area_name: test_area}}
  resampler: '{script}'
  input_filepath: '{input}'
  temp_directory: '{temp}'
  output_directory: '{output}'
"#, script=script.display(), input=input.display(), temp=temp.display(), output=output.display());

    let specs = match parse_tasks( &yaml).unwrap().remove(0) {
        Task::FilesFetch(specs) => specs,
        other => panic!("wrong task {other:?}")
    };

    let results = files::fetch_with( &api, &specs).await.unwrap();
    assert_eq!( results, vec![
        ("number of product ids", 3),
        ("number of fetched files", 1),
        ("number of failed fetches", 2),
    ]);

    let day = output.join("2022/01/01");
    assert_eq!( fs::read_to_string( day.join("seviri_20220101_00_12.nc")).unwrap().trim(), "resampled");
    assert!( !day.join("seviri_20220101_00_27.nc").exists());
    assert!( !day.join("seviri_20220101_00_42.nc").exists());

    // the scratch directory with downloads and native files is gone
    assert_eq!( fs::read_dir( &temp).unwrap().count(), 0);
}
