// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use objgraph::buffer::{Reader, Writer};
use objgraph::{ClassBuilder, Error, ObjGraph, SpecialBuilder, SpecialFormat, TypeRegistry, Value};
use objgraph_tests::{named, round_trip};
use std::any::Any;

#[derive(Debug, Default, PartialEq)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl SpecialFormat for Rgb {
    fn save(&self, writer: &mut Writer) -> Result<(), Error> {
        writer.write_u8(self.r);
        writer.write_u8(self.g);
        writer.write_u8(self.b);
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader) -> Result<(), Error> {
        self.r = reader.read_u8()?;
        self.g = reader.read_u8()?;
        self.b = reader.read_u8()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Forgets the blue channel when loading.
#[derive(Default)]
struct LossyRgb(Rgb);

impl SpecialFormat for LossyRgb {
    fn save(&self, writer: &mut Writer) -> Result<(), Error> {
        self.0.save(writer)
    }

    fn load(&mut self, reader: &mut Reader) -> Result<(), Error> {
        self.0.r = reader.read_u8()?;
        self.0.g = reader.read_u8()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn palette(lossy: bool) -> TypeRegistry {
    let special = if lossy {
        SpecialBuilder::new("t.Rgb", || Box::new(LossyRgb::default()))
    } else {
        SpecialBuilder::new("t.Rgb", || Box::new(Rgb::default()))
    };
    let mut registry = TypeRegistry::new();
    registry
        .register(special.build())
        .unwrap()
        .register(
            ClassBuilder::new("t.Palette")
                .field("fg", named("t.Rgb"))
                .field("bg", named("t.Rgb"))
                .build(),
        )
        .unwrap();
    registry
}

fn teal(graph: &ObjGraph) -> objgraph::ObjRef {
    let color = graph.registry().new_object(&named("t.Rgb")).unwrap();
    *color.borrow_mut().as_special_mut::<Rgb>().unwrap() = Rgb { r: 0, g: 128, b: 128 };
    color
}

#[test]
fn test_special_round_trip() {
    let graph = ObjGraph::new(palette(false));
    let color = teal(&graph);
    let bytes = graph.serialize(&Value::Object(color)).unwrap();
    // payload then its length
    let n = bytes.len();
    assert_eq!(&bytes[n - 11..], &[0, 128, 128, 3, 0, 0, 0, 0, 0, 0, 0]);

    let read = graph.deserialize(&bytes).unwrap();
    let read = read.as_object().unwrap().borrow();
    assert_eq!(read.as_special::<Rgb>(), Some(&Rgb { r: 0, g: 128, b: 128 }));
}

#[test]
fn test_shared_special() {
    let graph = ObjGraph::new(palette(false));
    let palette = graph.registry().new_object(&named("t.Palette")).unwrap();
    let color = teal(&graph);
    palette.set("fg", color.clone()).unwrap();
    palette.set("bg", color).unwrap();
    let read = round_trip(&graph, &Value::Object(palette));
    let read = read.as_object().unwrap();
    assert_eq!(read.get("fg").unwrap(), read.get("bg").unwrap());
}

#[test]
fn test_consumed_length_is_checked() {
    let writer = ObjGraph::new(palette(false));
    let reader = ObjGraph::new(palette(true));
    let bytes = writer.serialize(&Value::Object(teal(&writer))).unwrap();
    assert!(matches!(reader.deserialize(&bytes), Err(Error::InvalidData(_))));
}
