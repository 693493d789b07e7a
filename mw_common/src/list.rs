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

//! lists of items (product IDs, file paths) that carry a datetime and can be queried by time

use std::marker::PhantomData;
use chrono::{DateTime, Utc};

use crate::datetime::assert_start_precedes_end;
use crate::errors::{Result, index_error, value_error};
use crate::parse::DateTimeParser;

/// non-empty list of items together with the datetimes `P` parsed from them
#[derive(Debug,Clone)]
pub struct DatedList<P: DateTimeParser> {
    items: Vec<String>,
    datetimes: Vec<DateTime<Utc>>,
    _parser: PhantomData<P>,
}

impl<P: DateTimeParser> DatedList<P> {
    pub fn new<S: ToString> (items: &[S])->Result<Self> {
        if items.is_empty() {
            return Err( value_error("List cannot be empty."))
        }

        let items: Vec<String> = items.iter().map( |i| i.to_string()).collect();
        let datetimes = P::parse_collection( &items)?;
        Ok( DatedList { items, datetimes, _parser: PhantomData } )
    }

    pub fn len (&self)->usize { self.items.len() }

    pub fn is_empty (&self)->bool { self.items.is_empty() }

    pub fn items (&self)->&[String] { &self.items }

    pub fn datetimes (&self)->&[DateTime<Utc>] { &self.datetimes }

    /// indices of items with `start <= datetime < end`
    pub fn query_indices (&self, start: &DateTime<Utc>, end: &DateTime<Utc>)->Result<Vec<usize>> {
        assert_start_precedes_end( start, end)?;
        Ok( self.datetimes.iter().enumerate()
            .filter( |(_,dt)| *dt >= start && *dt < end)
            .map( |(i,_)| i)
            .collect()
        )
    }

    pub fn query (&self, start: &DateTime<Utc>, end: &DateTime<Utc>)->Result<Vec<String>> {
        Ok( self.query_indices( start, end)?.into_iter().map( |i| self.items[i].clone()).collect() )
    }

    /// same as `query` but returns the parsed datetimes
    pub fn query_datetimes (&self, start: &DateTime<Utc>, end: &DateTime<Utc>)->Result<Vec<DateTime<Utc>>> {
        Ok( self.query_indices( start, end)?.into_iter().map( |i| self.datetimes[i]).collect() )
    }

    /// turn a (possibly negative, i.e. counted from the end) index into a valid position
    pub fn normalize_index (&self, index: isize)->Result<usize> {
        let n = self.items.len() as isize;
        let idx = if index < 0 { n + index } else { index };
        if idx < 0 || idx >= n {
            Err( index_error("Index is out of range."))
        } else {
            Ok( idx as usize )
        }
    }

    /// sliding windows of `k` consecutive items, one per index in `[index_start, index_end]`. Each window ends at
    /// its index. Indices smaller than `k-1` are raised to `k-1`, which always yields the first full window even if
    /// that lies past `index_end`
    pub fn generate_k_sized_batches_by_index (&self, k: usize, index_start: isize, index_end: isize)->Result<Vec<Vec<String>>> {
        if k == 0 {
            return Err( value_error("The batch size must be positive."))
        }
        if self.items.len() < k {
            return Err( value_error("The batch size exceeds the number of list items."))
        }

        let start = self.normalize_index( index_start)?;
        let end = self.normalize_index( index_end)?;
        if start > end {
            return Err( value_error( format!("index_start={start} is larger than index_end={end}.")))
        }

        let mut batches = Vec::new();
        let mut idx = start;
        while idx <= end {
            if idx < k-1 { idx = k-1 }
            batches.push( self.items[idx+1-k ..= idx].to_vec());
            idx += 1;
        }
        Ok(batches)
    }
}
