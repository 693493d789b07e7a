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

//! datetime ranges, batches and snapshot flooring, plus serde support for the datetime and interval
//! formats we accept in task files

use std::{fmt, time::Duration};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Deserialize, Serializer, Deserializer, de::{self, Error as DeError, MapAccess, SeqAccess, Visitor}};
use parse_duration::parse;

use crate::errors::{Result, value_error};

#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }

#[inline]
pub fn utc_now()->DateTime<Utc> {
    Utc::now()
}

/// temporal order of batches or sorted items
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all="lowercase")]
pub enum Order {
    Ascending,
    Descending
}

/// return the full hour for given DateTime (minutes, seconds and nanos all zeroed)
pub fn full_hour (dt: &DateTime<Utc>)->DateTime<Utc> {
    dt.with_minute(0)
        .and_then( |d| d.with_second(0))
        .and_then( |d| d.with_nanosecond(0))
        .unwrap_or(*dt)
}

pub fn assert_start_precedes_end (start: &DateTime<Utc>, end: &DateTime<Utc>)->Result<()> {
    if start > end {
        Err( value_error( format!("start_datetime='{start}' is later than end_datetime='{end}'.")))
    } else {
        Ok(())
    }
}

pub fn assert_datetime_has_past (dt: &DateTime<Utc>)->Result<()> {
    if *dt > utc_now() {
        Err( value_error( format!("datetime='{dt}' is in the future.")))
    } else {
        Ok(())
    }
}

/// `dt + interval`, failing instead of panicking if the result is not representable
pub fn checked_add_interval (dt: &DateTime<Utc>, interval: TimeDelta)->Result<DateTime<Utc>> {
    dt.checked_add_signed( interval)
        .ok_or_else( || value_error( format!("adding interval {interval} to datetime='{dt}' is out of range.")))
}

pub fn number_of_days_in_month (year: i32, month: u32)->Result<u32> {
    let first = NaiveDate::from_ymd_opt( year, month, 1).ok_or_else(|| value_error( format!("invalid month {year}-{month}")))?;
    let next = if month == 12 { NaiveDate::from_ymd_opt( year+1, 1, 1) } else { NaiveDate::from_ymd_opt( year, month+1, 1) };
    let next = next.ok_or_else(|| value_error( format!("month out of range {year}-{month}")))?;
    Ok( (next - first).num_days() as u32 )
}

/// datetimes from `start` (inclusive) to `end` (exclusive), stepping by a positive or negative interval.
/// Start and end being equal yields nothing, as does an interval that points away from `end`
pub fn datetime_range (start: DateTime<Utc>, end: DateTime<Utc>, interval: TimeDelta)->Result<Vec<DateTime<Utc>>> {
    if interval.is_zero() { return Err( value_error("interval must not be zero")) }

    let mut list = Vec::new();
    if start == end { return Ok(list) }

    // XOR with the sign lets one comparison cover both directions
    let neg = interval < TimeDelta::zero();
    let mut dt = start;
    let mut next = checked_add_interval( &dt, interval)?;
    while neg ^ (next < end) {
        list.push( dt);
        dt = next;
        next = checked_add_interval( &dt, interval)?;
    }
    if neg ^ (dt < end) {
        list.push( dt);
    }

    Ok(list)
}

/// split the period between `start` and `end` (inclusive) into `(min,max)` pairs of `interval` length.
/// The last batch covers the remainder if the period is not divisible by `interval`. Equal start and
/// end give a single batch
pub fn datetime_batches (start: DateTime<Utc>, end: DateTime<Utc>, interval: TimeDelta)->Result<Vec<(DateTime<Utc>,DateTime<Utc>)>> {
    if interval.is_zero() { return Err( value_error("batch interval must not be zero")) }

    let mut batches = Vec::new();
    if start == end {
        batches.push( (start,end));
        return Ok(batches)
    }

    let neg = interval < TimeDelta::zero();
    if !(neg ^ (end > start)) { return Ok(batches) }

    let mut dt = start;
    let mut next = checked_add_interval( &dt, interval)?;
    while neg ^ (next <= end) {
        batches.push( (dt.min(next), dt.max(next)));
        dt = next;
        next = checked_add_interval( &dt, interval)?;
    }

    if dt != end {
        batches.push( (dt.min(end), dt.max(end)));
    }

    Ok(batches)
}

/// batches for a query period that has to be in chronological order. Descending order returns the latest batch first
pub fn generate_datetime_batches (start: DateTime<Utc>, end: DateTime<Utc>, interval: TimeDelta, order: Order)->Result<Vec<(DateTime<Utc>,DateTime<Utc>)>> {
    assert_start_precedes_end( &start, &end)?;
    let interval = interval.abs();

    match order {
        Order::Ascending => datetime_batches( start, end, interval),
        Order::Descending => datetime_batches( end, start, -interval)
    }
}

/// floor `dt` to the closest preceding snapshot minute. Snapshots are minutes within the hour (e.g. `[12,27,42,57]`
/// for SEVIRI). Minutes before the first snapshot fall back to the last snapshot of the previous hour
pub fn floor_datetime_minutes_to_specific_snapshots (dt: DateTime<Utc>, snapshots: &[u32])->DateTime<Utc> {
    if snapshots.is_empty() { return dt }

    let mut snapshots = snapshots.to_vec();
    snapshots.sort();

    let base = full_hour( &dt);
    let minute = dt.minute();
    let first = snapshots[0];
    let last = snapshots[snapshots.len()-1];

    if minute < first {
        base - TimeDelta::minutes( 60 - last as i64)
    } else {
        let m = snapshots.iter().rev().find( |s| **s <= minute).copied().unwrap_or(first);
        base + TimeDelta::minutes( m as i64)
    }
}

/* #region datetime models ***********************************************************************************/

/// a period given by its (past) start and end datetimes
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct DateTimePeriod {
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

impl DateTimePeriod {
    pub fn new (start_datetime: DateTime<Utc>, end_datetime: DateTime<Utc>)->Self {
        DateTimePeriod { start_datetime, end_datetime }
    }

    pub fn span (&self)->TimeDelta {
        self.end_datetime - self.start_datetime
    }

    /// if `sort` is set the first element is always the earlier datetime
    pub fn as_tuple (&self, sort: bool)->(DateTime<Utc>,DateTime<Utc>) {
        let (start,end) = (self.start_datetime, self.end_datetime);
        if sort { (start.min(end), start.max(end)) } else { (start,end) }
    }

    pub fn validate (&self)->Result<()> {
        assert_datetime_has_past( &self.start_datetime)?;
        assert_datetime_has_past( &self.end_datetime)?;
        assert_start_precedes_end( &self.start_datetime, &self.end_datetime)
    }
}

/// end-exclusive range of datetimes
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct DateTimeRange {
    pub period: DateTimePeriod,
    pub interval: TimeDelta,
}

impl DateTimeRange {
    pub fn datetimes (&self)->Result<Vec<DateTime<Utc>>> {
        datetime_range( self.period.start_datetime, self.period.end_datetime, self.interval)
    }
}

/// end-inclusive range split into batches
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct DateTimeRangeInBatches {
    pub period: DateTimePeriod,
    pub batch_interval: TimeDelta,
}

impl DateTimeRangeInBatches {
    pub fn batches (&self)->Result<Vec<DateTimePeriod>> {
        let batches = datetime_batches( self.period.start_datetime, self.period.end_datetime, self.batch_interval)?;
        Ok( batches.into_iter().map( |(s,e)| DateTimePeriod::new(s,e)).collect() )
    }
}

/* #endregion datetime models */

/* #region serde support *************************************************************************************/

/// build a timezone aware datetime from `[year, month, day, hour?, minute?, second?, microsecond?]`
pub fn datetime_from_components (components: &[i64], tz: Tz)->Result<DateTime<Utc>> {
    if components.len() < 3 || components.len() > 7 {
        return Err( value_error( format!("expected 3 to 7 datetime components, got {}", components.len())))
    }
    if let Some(c) = components.iter().find( |c| **c < 0) {
        return Err( value_error( format!("datetime components must be non-negative, got {c}")))
    }

    let c = |i: usize| components.get(i).copied().unwrap_or(0);
    let invalid = || value_error( format!("invalid datetime {components:?}"));

    let i = |idx: usize| i32::try_from( c(idx)).map_err( |_| invalid());
    let u = |idx: usize| u32::try_from( c(idx)).map_err( |_| invalid());

    let date = NaiveDate::from_ymd_opt( i(0)?, u(1)?, u(2)?).ok_or_else(invalid)?;
    let naive = date.and_hms_micro_opt( u(3)?, u(4)?, u(5)?, u(6)?).ok_or_else(invalid)?;

    tz.from_local_datetime( &naive)
        .single()
        .map( |dt| dt.with_timezone(&Utc))
        .ok_or_else( || value_error( format!("ambiguous or non-existent local time {naive} in {tz}")))
}

/// deserialize a datetime either given as component list `[2022,1,1,0,0]` (UTC) or as
/// map `{datetime: [2022,1,1], timezone: "Europe/Stockholm"}`
pub fn de_datetime<'de,D> (deserializer: D)->std::result::Result<DateTime<Utc>,D::Error> where D: Deserializer<'de> {
    deserializer.deserialize_any( DateTimeVisitor)
}

struct DateTimeVisitor;

impl<'de> Visitor<'de> for DateTimeVisitor {
    type Value = DateTime<Utc>;

    fn expecting (&self, f: &mut fmt::Formatter)->fmt::Result {
        write!(f, "a list of 3 to 7 non-negative integers or a map with `datetime` and optional `timezone` keys")
    }

    fn visit_seq<A> (self, mut seq: A)->std::result::Result<Self::Value,A::Error> where A: SeqAccess<'de> {
        let mut components: Vec<i64> = Vec::new();
        while let Some(c) = seq.next_element::<i64>()? {
            components.push(c);
        }
        datetime_from_components( &components, Tz::UTC).map_err( A::Error::custom)
    }

    fn visit_map<A> (self, mut map: A)->std::result::Result<Self::Value,A::Error> where A: MapAccess<'de> {
        let mut components: Option<Vec<i64>> = None;
        let mut tz: Option<Tz> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "datetime" => {
                    if components.is_some() { return Err( A::Error::duplicate_field("datetime")) }
                    components = Some( map.next_value()?);
                }
                "timezone" => {
                    if tz.is_some() { return Err( A::Error::duplicate_field("timezone")) }
                    let name: String = map.next_value()?;
                    tz = Some( name.parse::<Tz>().map_err( |_| A::Error::custom( format!("unknown timezone '{name}'")))?);
                }
                other => return Err( A::Error::unknown_field( other, &["datetime", "timezone"]))
            }
        }

        let components = components.ok_or_else( || A::Error::missing_field("datetime"))?;
        datetime_from_components( &components, tz.unwrap_or(Tz::UTC)).map_err( A::Error::custom)
    }
}

pub const TIME_INTERVAL_UNITS: &[&str] = &["weeks", "days", "hours", "minutes", "seconds"];

/// turn `(unit,value)` pairs into a signed time delta (microsecond resolution)
pub fn time_interval_from_units (units: &[(String,f64)])->Result<TimeDelta> {
    if units.is_empty() || units.len() > TIME_INTERVAL_UNITS.len() {
        return Err( value_error( format!("expected 1 to 5 interval entries, got {}", units.len())))
    }

    let mut seconds = 0.0;
    for (unit,value) in units {
        let factor = match unit.as_str() {
            "weeks" => 604800.0,
            "days" => 86400.0,
            "hours" => 3600.0,
            "minutes" => 60.0,
            "seconds" => 1.0,
            other => return Err( value_error( format!("unknown interval unit '{other}', expected one of {TIME_INTERVAL_UNITS:?}")))
        };
        if !value.is_finite() {
            return Err( value_error( format!("interval value for '{unit}' is not a finite number: {value}")))
        }
        seconds += value * factor;
    }

    // i64::MAX as f64 rounds up to 2^63 so this has to be a strict comparison
    let micros = (seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return Err( value_error( format!("time interval of {seconds} seconds is out of range.")))
    }
    Ok( TimeDelta::microseconds( micros as i64) )
}

/// deserialize a time interval given as map, e.g. `{days: 30}` or `{hours: -1, minutes: -30}`
pub fn de_time_interval<'de,D> (deserializer: D)->std::result::Result<TimeDelta,D::Error> where D: Deserializer<'de> {
    deserializer.deserialize_map( TimeIntervalVisitor)
}

struct TimeIntervalVisitor;

impl<'de> Visitor<'de> for TimeIntervalVisitor {
    type Value = TimeDelta;

    fn expecting (&self, f: &mut fmt::Formatter)->fmt::Result {
        write!(f, "a map with keys from {TIME_INTERVAL_UNITS:?} and numeric values")
    }

    fn visit_map<A> (self, mut map: A)->std::result::Result<Self::Value,A::Error> where A: MapAccess<'de> {
        let mut units: Vec<(String,f64)> = Vec::new();
        while let Some((unit,value)) = map.next_entry::<String,f64>()? {
            if units.iter().any( |(u,_)| *u == unit) {
                return Err( A::Error::custom( format!("duplicate interval unit '{unit}'")))
            }
            units.push( (unit,value));
        }
        time_interval_from_units( &units).map_err( A::Error::custom)
    }
}

/// deserialize a std Duration from a human readable string such as "30s" or "2 min"
pub fn deserialize_duration <'a,D>(deserializer: D)->std::result::Result<Duration,D::Error> where D: Deserializer<'a> {
    String::deserialize(deserializer).and_then( |string| {
        parse( string.as_str()).map_err( |e| D::Error::custom( format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S)->std::result::Result<S::Ok, S::Error> {
    s.serialize_str( &format!("{}s", dur.as_secs_f64()))
}

/* #endregion serde support */
