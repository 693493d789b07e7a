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

use serde::{Deserialize, Deserializer, Serialize};

/// literal sub-string pattern to select items (e.g. file names) with
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pattern {
    /// a single string or a list of strings. None matches everything
    #[serde(default, deserialize_with="de_strings")]
    pub sub_strings: Option<Vec<String>>,

    #[serde(default="default_true")]
    pub case_sensitive: bool,

    /// all sub strings have to be contained (otherwise any of them)
    #[serde(default="default_true")]
    pub match_all: bool,
}

fn default_true()->bool { true }

impl Default for Pattern {
    fn default()->Self {
        Pattern { sub_strings: None, case_sensitive: true, match_all: true }
    }
}

impl Pattern {
    pub fn new (sub_strings: &[&str])->Self {
        Pattern { sub_strings: Some( sub_strings.iter().map(|s| s.to_string()).collect()), ..Pattern::default() }
    }

    pub fn with_case_sensitive (mut self, case_sensitive: bool)->Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_match_all (mut self, match_all: bool)->Self {
        self.match_all = match_all;
        self
    }

    pub fn exists_in (&self, s: &str)->bool {
        let Some(sub_strings) = &self.sub_strings else { return true };

        if self.case_sensitive {
            self.check( sub_strings.iter().map( |ss| s.contains( ss.as_str())))
        } else {
            let s = s.to_lowercase();
            self.check( sub_strings.iter().map( |ss| s.contains( ss.to_lowercase().as_str())))
        }
    }

    fn check (&self, mut matches: impl Iterator<Item=bool>)->bool {
        if self.match_all { matches.all(|m| m) } else { matches.any(|m| m) }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>)
}

/// accept either `"abc"` or `["abc","def"]`
pub fn de_strings<'de,D> (deserializer: D)->Result<Option<Vec<String>>,D::Error> where D: Deserializer<'de> {
    let v: Option<OneOrMany> = Option::deserialize(deserializer)?;
    Ok( v.map( |v| match v {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(list) => list
    }))
}
