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

//! Field-by-field encoding of class instances and struct values, including
//! version tolerant reads.

use crate::config::{Config, VersionTolerance};
use crate::error::Error;
use crate::meta::{StampDiff, TypeDescriptor, TypeStamp};
use crate::objgraph::ObjGraph;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::meta_resolver::MetaReaderResolver;
use crate::resolver::type_resolver::TypeRegistry;
use crate::serializer::plan::{FieldPlan, FieldStep, FieldWritePlan, ValuePlan};
use crate::serializer::{read_value, write_value};
use crate::types::TypeCategory;
use crate::value::{Fields, Literal, ObjRef, Value};
use std::sync::Arc;

fn check_tolerance(config: &Config, desc: &TypeDescriptor, diff: &StampDiff) -> Result<(), Error> {
    if let Some((previous, current)) = diff.fields_changed.first() {
        return Err(Error::schema_mismatch(format!(
            "{}: field {}.{} changed type from {} to {}",
            desc, previous.class, previous.name, previous.field_type, current.field_type
        )));
    }
    let checks = [
        (
            diff.has_chain_changes(),
            VersionTolerance::INHERITANCE_CHAIN_CHANGE,
            "inheritance chain changed",
        ),
        (
            !diff.fields_added.is_empty(),
            VersionTolerance::FIELD_ADDITION,
            "fields were added",
        ),
        (
            !diff.fields_removed.is_empty(),
            VersionTolerance::FIELD_REMOVAL,
            "fields were removed",
        ),
        (
            !diff.fields_moved.is_empty(),
            VersionTolerance::FIELD_MOVE,
            "fields were moved",
        ),
    ];
    for (changed, tolerance, what) in checks {
        if changed && !config.allows(tolerance) {
            return Err(Error::schema_mismatch(format!(
                "{}: {} and {:?} is not enabled",
                desc, what, tolerance
            )));
        }
    }
    Ok(())
}

/// Plan for a field the current type no longer stores.
fn discard_plan(
    registry: &TypeRegistry,
    types: &MetaReaderResolver,
    field_type: &TypeDescriptor,
) -> Result<ValuePlan, Error> {
    match ValuePlan::of(registry, field_type) {
        Ok(ValuePlan::Reference(_)) => Ok(ValuePlan::Reference(TypeDescriptor::object())),
        Ok(plan) => Ok(plan),
        Err(Error::UnresolvedType(msg)) => {
            match types.find(field_type).map(|t| t.category) {
                Some(TypeCategory::Value) => Err(Error::UnresolvedType(msg)),
                // null, back references and resolvable objects can still be skipped
                _ => Ok(ValuePlan::Reference(TypeDescriptor::object())),
            }
        }
        Err(err) => Err(err),
    }
}

/// Builds the field reads of `desc` for a stream written with `stream_stamp`.
///
/// Steps follow the stream's field order. Fields the current type lacks are
/// read and discarded, moved fields land in their new slot, and fields the
/// stream lacks keep their default.
pub(crate) fn build_field_plan(
    graph: &ObjGraph,
    desc: &TypeDescriptor,
    stream_stamp: Option<&Arc<TypeStamp>>,
    types: &MetaReaderResolver,
) -> Result<FieldPlan, Error> {
    let registry = graph.registry();
    let layout = registry.layout_of(desc)?;
    let current = registry
        .stamp_of(desc, false)?
        .ok_or_else(|| Error::type_error(format!("{} has no fields", desc)))?;
    let previous = stream_stamp.cloned().unwrap_or_else(|| current.clone());

    let slot_of = |class: &str, name: &str| {
        layout.find(class, name).ok_or_else(|| {
            Error::unknown(format!("{}.{} missing from layout of {}", class, name, desc))
        })
    };

    let mut steps = Vec::with_capacity(previous.field_count());
    if previous == current {
        for (class, field) in current.fields() {
            steps.push(FieldStep {
                target: Some(slot_of(&class.name, &field.name)?),
                value: ValuePlan::of(registry, &field.field_type)?,
            });
        }
    } else {
        let diff = graph.stamp_diff(&current, &previous);
        check_tolerance(graph.config(), desc, &diff)?;
        log::debug!("reading {} through stamp diff {:?}", desc, diff);
        let has_field = |class: &str, name: &str| {
            current
                .classes()
                .iter()
                .any(|c| c.name == class && c.fields.iter().any(|f| f.name == name))
        };
        for (class, field) in previous.fields() {
            let mapped = if current.class_names().any(|c| c == class.name) {
                Some(class.name.as_str())
            } else {
                diff.renamed_to(&class.name)
            };
            let target = match mapped.filter(|c| has_field(c, &field.name)) {
                Some(mapped) => Some(slot_of(mapped, &field.name)?),
                None => match diff.moved_to(&class.name, &field.name) {
                    Some(to) => Some(slot_of(&to.class, &to.name)?),
                    None => None,
                },
            };
            let value = match target {
                Some(slot) => ValuePlan::of(registry, &layout.fields[slot].field_type)?,
                None => discard_plan(registry, types, &field.field_type)?,
            };
            steps.push(FieldStep { target, value });
        }
    }

    let mut constructed = Vec::new();
    for (slot, field) in layout.fields.iter().enumerate() {
        if let (true, Some(args)) = (field.transient, &field.constructor_args) {
            if registry.resolve(&field.field_type)?.constructor().is_none() {
                return Err(Error::configuration(format!(
                    "{}.{} is built from arguments but {} has no constructor",
                    desc, field.name, field.field_type
                )));
            }
            constructed.push((slot, field.field_type.clone(), args.clone()));
        }
    }
    Ok(FieldPlan {
        layout,
        steps,
        constructed,
    })
}

pub(crate) fn write_fields(
    ctx: &mut WriteContext,
    payload: &Value,
    plan: &FieldWritePlan,
) -> Result<(), Error> {
    fn collect(fields: &Fields, plan: &FieldWritePlan) -> Result<Vec<Value>, Error> {
        if Arc::ptr_eq(fields.layout(), &plan.layout) {
            return Ok(plan
                .steps
                .iter()
                .map(|step| fields.slot(step.slot).clone())
                .collect());
        }
        // instance laid out by another registry
        plan.steps
            .iter()
            .map(|step| {
                fields.get_in(&step.class, &step.name).cloned().ok_or_else(|| {
                    Error::type_error(format!(
                        "{} has no field {}.{}",
                        fields.type_descriptor(),
                        step.class,
                        step.name
                    ))
                })
            })
            .collect()
    }

    let values = match payload {
        Value::Object(obj) => {
            let object = obj.borrow();
            let fields = object.fields().ok_or_else(|| {
                Error::type_error(format!("{} has no fields", object.type_descriptor()))
            })?;
            collect(fields, plan)?
        }
        Value::Struct(fields) => collect(fields, plan)?,
        other => {
            return Err(Error::type_mismatch(
                plan.layout.ty.to_string(),
                other.kind_name(),
            ))
        }
    };
    for (step, value) in plan.steps.iter().zip(&values) {
        write_value(ctx, value, &step.value)?;
    }
    Ok(())
}

fn construct_transients(
    ctx: &ReadContext,
    plan: &FieldPlan,
    mut store: impl FnMut(usize, Value) -> Result<(), Error>,
) -> Result<(), Error> {
    for (slot, ty, args) in &plan.constructed {
        let args: Vec<Value> = args.iter().map(Literal::to_value).collect();
        let value = ctx.graph().registry().construct(ty, &args)?;
        store(*slot, value)?;
    }
    Ok(())
}

/// Fills an allocated instance by direct field assignment.
pub(crate) fn read_instance(
    ctx: &mut ReadContext,
    obj: &ObjRef,
    plan: &FieldPlan,
) -> Result<(), Error> {
    let store = |slot: usize, value: Value| -> Result<(), Error> {
        let mut object = obj.borrow_mut();
        let ty = object.type_descriptor().clone();
        object
            .fields_mut()
            .ok_or_else(|| Error::type_error(format!("{} has no fields", ty)))?
            .set_slot(slot, value);
        Ok(())
    };
    for step in &plan.steps {
        let value = read_value(ctx, &step.value)?;
        if let Some(slot) = step.target {
            store(slot, value)?;
        }
    }
    construct_transients(ctx, plan, store)
}

pub(crate) fn read_struct(ctx: &mut ReadContext, ty: &TypeDescriptor) -> Result<Value, Error> {
    ctx.inc_depth()?;
    let plan = ctx.struct_plan(ty)?;
    let mut fields = ctx.graph().registry().default_fields(ty)?;
    for step in &plan.steps {
        let value = read_value(ctx, &step.value)?;
        if let Some(slot) = step.target {
            fields.set_slot(slot, value);
        }
    }
    construct_transients(ctx, &plan, |slot, value| {
        fields.set_slot(slot, value);
        Ok(())
    })?;
    ctx.dec_depth();
    Ok(Value::Struct(Box::new(fields)))
}
