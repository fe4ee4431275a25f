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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::meta::{ClassStamp, FieldStamp, Shape, TypeDescriptor, TypeStamp};
use crate::resolver::type_resolver::TypeRegistry;
use crate::types::{DescriptorTag, TypeCategory};
use std::collections::HashMap;
use std::sync::Arc;

const MAX_TYPE_ARGS: u32 = 64;
const MAX_STAMP_CLASSES: u32 = 256;
const MAX_STAMP_FIELDS: u32 = 1 << 16;

/// A type as the writer of the stream described it.
#[derive(Debug)]
pub struct StreamType {
    pub index: usize,
    pub descriptor: TypeDescriptor,
    pub category: TypeCategory,
    pub stamp: Option<Arc<TypeStamp>>,
}

/// Streaming type table writer. Uses the streaming protocol:
/// - `index << 1` for a new type, followed by its definition
/// - `(index << 1) | 1` for a type already sent in this pass
///
/// A definition is the descriptor shape (type arguments and array elements
/// as nested type references), the category byte and an optional stamp
/// whose field types are nested type references too.
#[derive(Default)]
pub struct MetaWriterResolver {
    type_index_map: HashMap<TypeDescriptor, usize>,
}

impl MetaWriterResolver {
    pub fn write_type(
        &mut self,
        writer: &mut Writer,
        desc: &TypeDescriptor,
        registry: &TypeRegistry,
        collections_as_objects: bool,
    ) -> Result<(), Error> {
        if let Some(&index) = self.type_index_map.get(desc) {
            writer.write_varuint32(((index as u32) << 1) | 1);
            return Ok(());
        }
        let def = registry.resolve(desc)?;
        let index = self.type_index_map.len();
        self.type_index_map.insert(desc.clone(), index);
        writer.write_varuint32((index as u32) << 1);
        log::trace!("type table: sending {:?} as #{}", desc, index);

        match desc.shape() {
            Shape::Named { name, module, args } => {
                writer.write_u8(DescriptorTag::Named.into());
                writer.write_string(name);
                writer.write_string(module);
                writer.write_varuint32(args.len() as u32);
                for arg in args {
                    self.write_type(writer, arg, registry, collections_as_objects)?;
                }
            }
            Shape::Array { element, rank } => {
                writer.write_u8(DescriptorTag::Array.into());
                writer.write_u8(*rank);
                self.write_type(writer, element, registry, collections_as_objects)?;
            }
        }
        writer.write_u8(def.category().into());
        match registry.stamp_of(desc, collections_as_objects)? {
            Some(stamp) => {
                writer.write_bool(true);
                writer.write_varuint32(stamp.classes().len() as u32);
                for class in stamp.classes() {
                    writer.write_string(&class.name);
                    writer.write_string(&class.module);
                    writer.write_varuint32(class.fields.len() as u32);
                    for field in &class.fields {
                        writer.write_string(&field.name);
                        self.write_type(writer, &field.field_type, registry, collections_as_objects)?;
                    }
                }
            }
            None => writer.write_bool(false),
        }
        Ok(())
    }
}

/// Streaming type table reader, the inverse of [`MetaWriterResolver`].
///
/// The index of a new type is reserved before its definition is read so a
/// stamp may refer to the type it belongs to.
#[derive(Default)]
pub struct MetaReaderResolver {
    descriptors: Vec<Option<TypeDescriptor>>,
    types: Vec<Option<Arc<StreamType>>>,
    by_descriptor: HashMap<TypeDescriptor, Arc<StreamType>>,
}

impl MetaReaderResolver {
    pub fn get(&self, index: usize) -> Option<&Arc<StreamType>> {
        self.types.get(index).and_then(Option::as_ref)
    }

    /// Stream definition of a type received earlier in this pass.
    pub fn find(&self, desc: &TypeDescriptor) -> Option<&Arc<StreamType>> {
        self.by_descriptor.get(desc)
    }

    /// Reads a type reference whose definition must be complete.
    pub fn read_type(&mut self, reader: &mut Reader) -> Result<Arc<StreamType>, Error> {
        let index = self.read_entry(reader)?;
        self.get(index).cloned().ok_or_else(|| {
            Error::invalid_data(format!("type #{} used inside its own definition", index))
        })
    }

    /// Reads a type reference where only the descriptor is needed.
    pub fn read_descriptor(&mut self, reader: &mut Reader) -> Result<TypeDescriptor, Error> {
        let index = self.read_entry(reader)?;
        self.descriptors
            .get(index)
            .cloned()
            .flatten()
            .ok_or_else(|| {
                Error::invalid_data(format!("type #{} used inside its own shape", index))
            })
    }

    fn read_entry(&mut self, reader: &mut Reader) -> Result<usize, Error> {
        let marker = reader.read_varuint32()?;
        let index = (marker >> 1) as usize;
        if marker & 1 == 1 {
            if index >= self.descriptors.len() {
                return Err(Error::invalid_data(format!(
                    "type #{} not found, {} types received",
                    index,
                    self.descriptors.len()
                )));
            }
            return Ok(index);
        }
        if index != self.descriptors.len() {
            return Err(Error::invalid_data(format!(
                "new type #{} out of sequence, expected #{}",
                index,
                self.descriptors.len()
            )));
        }
        self.descriptors.push(None);
        self.types.push(None);

        let tag = DescriptorTag::try_from(reader.read_u8()?)
            .map_err(|e| Error::invalid_data(format!("bad descriptor tag: {}", e)))?;
        let descriptor = match tag {
            DescriptorTag::Named => {
                let name = reader.read_string()?;
                let module = reader.read_string()?;
                let argc = reader.read_varuint32()?;
                if argc > MAX_TYPE_ARGS {
                    return Err(Error::invalid_data(format!("{} type arguments", argc)));
                }
                let args = (0..argc)
                    .map(|_| self.read_descriptor(reader))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeDescriptor::generic(&name, &module, args)
            }
            DescriptorTag::Array => {
                let rank = reader.read_u8()?;
                let element = self.read_descriptor(reader)?;
                TypeDescriptor::array(element, rank)
            }
        };
        self.descriptors[index] = Some(descriptor.clone());

        let category = TypeCategory::try_from(reader.read_u8()?)
            .map_err(|e| Error::invalid_data(format!("bad type category: {}", e)))?;
        let stamp = if reader.read_bool()? {
            Some(Arc::new(self.read_stamp(reader)?))
        } else {
            None
        };
        log::trace!("type table: received {:?} as #{}", descriptor, index);
        let stream_type = Arc::new(StreamType {
            index,
            descriptor: descriptor.clone(),
            category,
            stamp,
        });
        self.by_descriptor.insert(descriptor, stream_type.clone());
        self.types[index] = Some(stream_type);
        Ok(index)
    }

    fn read_stamp(&mut self, reader: &mut Reader) -> Result<TypeStamp, Error> {
        let class_count = reader.read_varuint32()?;
        if class_count > MAX_STAMP_CLASSES {
            return Err(Error::invalid_data(format!("{} classes in stamp", class_count)));
        }
        let mut classes = Vec::with_capacity(class_count as usize);
        for _ in 0..class_count {
            let name = reader.read_string()?;
            let module = reader.read_string()?;
            let field_count = reader.read_varuint32()?;
            if field_count > MAX_STAMP_FIELDS {
                return Err(Error::invalid_data(format!(
                    "{} fields in class {}",
                    field_count, name
                )));
            }
            let mut fields = Vec::with_capacity((field_count as usize).min(reader.remaining()));
            for _ in 0..field_count {
                let name = reader.read_string()?;
                let field_type = self.read_descriptor(reader)?;
                fields.push(FieldStamp { name, field_type });
            }
            classes.push(ClassStamp {
                name,
                module,
                fields,
            });
        }
        Ok(TypeStamp::new(classes))
    }
}
