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

//! filesystem utilities: directory visitors, line based item files, datetime directories, scratch
//! directories and size based file integrity checks

use std::collections::HashSet;
use std::fmt::Display;
use std::fs::{self, DirEntry, File, OpenOptions};
use std::hash::Hash;
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{Result, value_error};
use crate::io_error;
use crate::pattern::Pattern;

pub fn filename<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_name().and_then(|ostr| ostr.to_str())
}

pub fn path_to_lossy_string (path: impl AsRef<Path>)->String {
    path.as_ref().to_string_lossy().to_string()
}

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>)->io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err(io_error!(ErrorKind::PermissionDenied, "dir {:?} not writable", &path))
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path)
    }
}

/* #region directory visitor *********************************************************************************/

fn collect_files (dir: &Path, pattern: &Pattern, recursive: bool, list: &mut Vec<PathBuf>)->io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_files( &path, pattern, recursive, list)?;
            }
        } else if path.is_file() && filename(&path).map( |f| pattern.exists_in(f)).unwrap_or(false) {
            list.push( path);
        }
    }
    Ok(())
}

/// sorted list of files in `dir` whose names match `pattern`
pub fn visit_files (dir: impl AsRef<Path>, pattern: &Pattern, recursive: bool, reverse: bool)->Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err( io_error!(ErrorKind::NotFound, "not a directory: {:?}", dir).into())
    }

    let mut list = Vec::new();
    collect_files( dir, pattern, recursive, &mut list)?;

    list.sort();
    if reverse { list.reverse() }
    Ok(list)
}

/// visits (top level or recursive) files of a directory that match a pattern
#[derive(Debug,Clone,PartialEq)]
pub struct DirectoryVisitor {
    pub input_directory: PathBuf,
    pub pattern: Pattern,
    pub recursive: bool,
    pub reverse: bool,

    /// if set the visited file paths are written to it, one per line
    pub output_filepath: Option<PathBuf>,
}

impl DirectoryVisitor {
    pub fn new (input_directory: impl AsRef<Path>)->Self {
        DirectoryVisitor {
            input_directory: input_directory.as_ref().to_path_buf(),
            pattern: Pattern::default(),
            recursive: true,
            reverse: false,
            output_filepath: None
        }
    }

    pub fn with_pattern (mut self, pattern: Pattern)->Self { self.pattern = pattern; self }
    pub fn with_recursive (mut self, recursive: bool)->Self { self.recursive = recursive; self }
    pub fn with_reverse (mut self, reverse: bool)->Self { self.reverse = reverse; self }

    pub fn visit (&self)->Result<Vec<PathBuf>> {
        self.visit_with( |_| Ok(()))
    }

    /// call `callback` for every matching file (in sorted order)
    pub fn visit_with<F> (&self, mut callback: F)->Result<Vec<PathBuf>> where F: FnMut(&Path)->Result<()> {
        let files = visit_files( &self.input_directory, &self.pattern, self.recursive, self.reverse)?;

        for file in &files {
            callback( file)?;
        }

        if let Some(output_filepath) = &self.output_filepath {
            write_items( output_filepath, files.iter().map( path_to_lossy_string), false)?;
        }

        Ok(files)
    }
}

/// copy top level files of `src` that match `pattern` into `dst`. Returns the number of copied files
pub fn copy_files_between_directories (src: impl AsRef<Path>, dst: impl AsRef<Path>, pattern: &Pattern)->Result<usize> {
    let dst = dst.as_ref();
    let files = visit_files( src, pattern, false, false)?;

    for file in &files {
        if let Some(fname) = filename(file) {
            fs::copy( file, dst.join(fname))?;
        }
    }
    Ok( files.len() )
}

/* #endregion directory visitor */

/* #region item files ****************************************************************************************/

/// write items one per line (trimmed). Returns the number of written items
pub fn write_items<I,S> (path: impl AsRef<Path>, items: I, append: bool)->Result<usize> where I: IntoIterator<Item=S>, S: Display {
    let file = OpenOptions::new().create(true).write(true).append(append).truncate(!append).open( path.as_ref())?;
    let mut w = BufWriter::new(file);
    let mut n = 0;

    for item in items {
        writeln!( w, "{}", item.to_string().trim())?;
        n += 1;
    }
    w.flush()?;

    Ok(n)
}

/// create (or truncate) `path` and append all batches. Returns the total number of written items
pub fn write_items_in_batches<B,I,S> (path: impl AsRef<Path>, batches: B)->Result<usize>
    where B: IntoIterator<Item=I>, I: IntoIterator<Item=S>, S: Display
{
    let path = path.as_ref();
    File::create( path)?;

    let mut n = 0;
    for batch in batches {
        n += write_items( path, batch, true)?;
    }
    Ok(n)
}

/// read non-empty lines of a text file
pub fn read_items (path: impl AsRef<Path>, trim: bool)->Result<Vec<String>> {
    let reader = BufReader::new( File::open( path.as_ref())?);
    let mut items = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let item = if trim { line.trim().to_string() } else { line };
        if !item.is_empty() {
            items.push( item);
        }
    }
    Ok(items)
}

/* #endregion item files */

/* #region datetime and scratch directories ******************************************************************/

/// directories named after datetimes, e.g. `<parent>/2022/03/12`
#[derive(Debug,Clone,PartialEq)]
pub struct DateTimeDirectory {
    pub format_string: String,
    pub parent: PathBuf,
    pub remove_directory_if_exists: bool,
}

impl DateTimeDirectory {
    pub fn new (parent: impl AsRef<Path>)->Self {
        DateTimeDirectory { format_string: "%Y/%m/%d".to_string(), parent: parent.as_ref().to_path_buf(), remove_directory_if_exists: false }
    }

    pub fn path (&self, dt: &DateTime<Utc>)->PathBuf {
        self.parent.join( dt.format( &self.format_string).to_string())
    }

    /// if `dry_run` is set nothing is created or removed, only the path is returned
    pub fn create (&self, dt: &DateTime<Utc>, dry_run: bool)->Result<PathBuf> {
        let path = self.path(dt);
        if !dry_run {
            if path.is_dir() && self.remove_directory_if_exists {
                fs::remove_dir_all( &path)?;
            }
            ensure_writable_dir( &path)?;
        }
        Ok(path)
    }
}

/// scratch directory inside a given parent that is removed (with its contents) when dropped
#[derive(Debug)]
pub struct TempDirectory {
    dir: tempfile::TempDir
}

impl TempDirectory {
    pub fn new_in (parent: impl AsRef<Path>)->Result<Self> {
        let dir = tempfile::Builder::new().prefix("mw_").tempdir_in( parent.as_ref())?;
        debug!("created temp directory {:?}", dir.path());
        Ok( TempDirectory { dir } )
    }

    pub fn path (&self)->&Path {
        self.dir.path()
    }
}

/// remove all files (recursively) below `dir` but keep the directory structure
pub fn remove_files_in_directory (dir: impl AsRef<Path>)->Result<usize> {
    let files = visit_files( dir, &Pattern::default(), true, false)?;
    for file in &files {
        fs::remove_file( file)?;
    }
    Ok( files.len() )
}

/* #endregion datetime and scratch directories */

/* #region file integrity ************************************************************************************/

/// size based integrity check. Files that differ more than `tolerance` (relative) from `nominal_size` are corrupted
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct FilesIntegrityValidator {
    pub nominal_size: Option<u64>,
    pub tolerance: f64,
}

impl Default for FilesIntegrityValidator {
    fn default()->Self {
        FilesIntegrityValidator { nominal_size: None, tolerance: 0.01 }
    }
}

impl FilesIntegrityValidator {
    pub fn is_corrupted (&self, file_size: u64)->bool {
        match self.nominal_size {
            Some(0) => file_size != 0,
            Some(nominal) => (1.0 - file_size as f64 / nominal as f64).abs() > self.tolerance,
            None => false
        }
    }

    /// None if there is no nominal size to check against
    pub fn find_corrupted_files (&self, files: &[PathBuf])->Result<Option<HashSet<PathBuf>>> {
        if self.nominal_size.is_none() { return Ok(None) }

        let mut corrupted = HashSet::new();
        for file in files {
            let size = fs::metadata( file)?.len();
            if self.is_corrupted( size) {
                warn!("corrupted file {:?} with size {}", file, size);
                corrupted.insert( file.clone());
            }
        }
        Ok( Some(corrupted) )
    }
}

/// compare files against reference items. Returns `(missing, corrupted)`, each None if it was not requested
/// (no reference or no nominal size). `transform` maps a file path to the reference item type
pub fn compare_files_against_reference<T,F> (
    files: &[PathBuf],
    reference: Option<&[T]>,
    transform: F,
    validator: &FilesIntegrityValidator
)->Result<(Option<HashSet<T>>, Option<HashSet<PathBuf>>)>
    where T: Eq + Hash + Clone, F: Fn(&Path)->Result<T>
{
    let missing = if let Some(reference) = reference {
        let transformed = files.iter().map( |f| transform(f)).collect::<Result<HashSet<T>>>()?;
        Some( reference.iter().filter( |r| !transformed.contains(r)).cloned().collect() )
    } else {
        None
    };

    let corrupted = validator.find_corrupted_files( files)?;
    Ok( (missing, corrupted) )
}

/* #endregion file integrity */
