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

//! minimal geometries used to restrict product queries

use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Vertex {
    pub longitude: f64,
    pub latitude: f64,
}

impl Vertex {
    pub fn new (longitude: f64, latitude: f64)->Self { Vertex { longitude, latitude } }
}

impl fmt::Display for Vertex {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{} {}", self.longitude, self.latitude)
    }
}

/// WKT style polygon, e.g. `POLYGON((10 40,20 40,20 50,10 40))`
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Polygon(pub Vec<Vertex>);

impl fmt::Display for Polygon {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        let vertices: Vec<String> = self.0.iter().map( |v| v.to_string()).collect();
        write!( f, "POLYGON(({}))", vertices.join(","))
    }
}

/// (north, south, west, east) limits in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl Default for BoundingBox {
    fn default()->Self {
        BoundingBox { north: 90.0, south: -90.0, west: -180.0, east: 180.0 }
    }
}

impl BoundingBox {
    /// closed polygon of the box corners
    pub fn to_polygon (&self)->Polygon {
        Polygon( vec![
            Vertex::new( self.west, self.south),
            Vertex::new( self.east, self.south),
            Vertex::new( self.east, self.north),
            Vertex::new( self.west, self.north),
            Vertex::new( self.west, self.south),
        ])
    }
}

impl fmt::Display for BoundingBox {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{},{},{},{}", self.north, self.south, self.west, self.east)
    }
}
