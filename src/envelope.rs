/*
    This file is part of Donet.

    Copyright © 2024 Max Rodriguez

    Donet is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    Donet is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with Donet. If not, see <https://www.gnu.org/licenses/>.
*/

//! Envelope builders: the handful of messages the AI/state-server/database
//! boundary actually exchanges, each a thin wrapper over
//! [`Datagram::add_server_header`] followed by the fields a schema-aware
//! caller supplies positionally (see SPEC_FULL.md §6). These are produced,
//! never parsed, by this crate.

use crate::dclass::DClass;
use crate::dcfile::DCFile;
use crate::datagram::Datagram;
use crate::error::EncodeError;
use crate::globals::{
    Channel, DoId, Zone, STATESERVER_OBJECT_CREATE_WITH_REQUIRED_CONTEXT, STATESERVER_OBJECT_GENERATE_WITH_REQUIRED,
    STATESERVER_OBJECT_GENERATE_WITH_REQUIRED_OTHER, STATESERVER_OBJECT_UPDATE_FIELD,
};
use crate::value::DCValue;

/// `STATESERVER_OBJECT_UPDATE_FIELD`: one field's new value, addressed by
/// its DCFile-global field number.
pub fn ai_format_update(
    field_number: u16,
    do_id: DoId,
    to: Channel,
    from: Channel,
    args: &[DCValue],
    dcfile: &DCFile,
) -> Result<Datagram, EncodeError> {
    let field = dcfile
        .field(field_number as usize)
        .ok_or_else(|| EncodeError::MissingArgument(format!("field #{field_number}")))?;

    let mut dg = Datagram::new();
    dg.add_server_header(&[to], from, STATESERVER_OBJECT_UPDATE_FIELD)?;
    dg.add_u32(do_id)?;
    dg.add_u16(field_number)?;
    field.pack_args(args, &mut dg, dcfile)?;
    Ok(dg)
}

/// `STATESERVER_OBJECT_GENERATE_WITH_REQUIRED[_OTHER]`: creates an object
/// with an already-assigned `do_id`. `required_values` must align
/// one-to-one with `dclass`'s non-molecular required fields in
/// `inherited_fields` order; a non-empty `other_values` switches the
/// message type to the `_OTHER` variant and appends its trailing section.
pub fn ai_format_generate(
    dclass: &DClass,
    do_id: DoId,
    parent: DoId,
    zone: Zone,
    district: Channel,
    from: Channel,
    required_values: &[DCValue],
    other_values: &[(u16, DCValue)],
    dcfile: &DCFile,
) -> Result<Datagram, EncodeError> {
    let msg_type = if other_values.is_empty() {
        STATESERVER_OBJECT_GENERATE_WITH_REQUIRED
    } else {
        STATESERVER_OBJECT_GENERATE_WITH_REQUIRED_OTHER
    };

    let mut dg = Datagram::new();
    dg.add_server_header(&[district], from, msg_type)?;
    dg.add_u32(parent)?;
    dg.add_u32(zone)?;
    dg.add_u16(dclass.number.unwrap_or(0))?;
    dg.add_u32(do_id)?;

    pack_required_fields(dclass, required_values, &mut dg, dcfile)?;

    if !other_values.is_empty() {
        dg.add_u16(other_values.len() as u16)?;
        for (number, value) in other_values {
            let field = dcfile
                .field(*number as usize)
                .ok_or_else(|| EncodeError::MissingArgument(format!("field #{number}")))?;
            dg.add_u16(*number)?;
            field.pack_args(std::slice::from_ref(value), &mut dg, dcfile)?;
        }
    }
    Ok(dg)
}

/// `STATESERVER_OBJECT_CREATE_WITH_REQUIRED_CONTEXT`, AI side: asks the
/// database to create an object from its fields' declared defaults, to be
/// matched back up by `context`. No `do_id` yet — the database assigns one.
pub fn ai_database_generate_context(
    dclass: &DClass,
    parent: DoId,
    zone: Zone,
    context: u32,
    database_channel: Channel,
    from: Channel,
    dcfile: &DCFile,
) -> Result<Datagram, EncodeError> {
    let mut dg = Datagram::new();
    dg.add_server_header(&[database_channel], from, STATESERVER_OBJECT_CREATE_WITH_REQUIRED_CONTEXT)?;
    dg.add_u32(parent)?;
    dg.add_u32(zone)?;
    dg.add_u16(dclass.number.unwrap_or(0))?;
    dg.add_u32(context)?;

    for &idx in &dclass.inherited_fields {
        let Some(field) = dcfile.field(idx) else { continue };
        if field.is_molecular() || !field.is_required() {
            continue;
        }
        field.pack_default(&mut dg, dcfile)?;
    }
    Ok(dg)
}

/// `STATESERVER_OBJECT_CREATE_WITH_REQUIRED_CONTEXT`, object-bearing side:
/// same shape as [`ai_database_generate_context`] but packs explicit
/// required field values instead of declared defaults.
pub fn database_generate_context(
    dclass: &DClass,
    parent: DoId,
    zone: Zone,
    context: u32,
    required_values: &[DCValue],
    database_channel: Channel,
    from: Channel,
    dcfile: &DCFile,
) -> Result<Datagram, EncodeError> {
    let mut dg = Datagram::new();
    dg.add_server_header(&[database_channel], from, STATESERVER_OBJECT_CREATE_WITH_REQUIRED_CONTEXT)?;
    dg.add_u32(parent)?;
    dg.add_u32(zone)?;
    dg.add_u16(dclass.number.unwrap_or(0))?;
    dg.add_u32(context)?;

    pack_required_fields(dclass, required_values, &mut dg, dcfile)?;
    Ok(dg)
}

fn pack_required_fields(
    dclass: &DClass,
    values: &[DCValue],
    dg: &mut Datagram,
    dcfile: &DCFile,
) -> Result<(), EncodeError> {
    let required_fields: Vec<usize> = dclass
        .inherited_fields
        .iter()
        .copied()
        .filter(|&idx| dcfile.field(idx).map(|f| !f.is_molecular() && f.is_required()).unwrap_or(false))
        .collect();

    if values.len() != required_fields.len() {
        return Err(EncodeError::WrongArity {
            expected: required_fields.len(),
            got: values.len(),
        });
    }

    for (&idx, value) in required_fields.iter().zip(values.iter()) {
        let field = dcfile
            .field(idx)
            .ok_or_else(|| EncodeError::MissingArgument(dclass.name.clone()))?;
        field.pack_args(std::slice::from_ref(value), dg, dcfile)?;
    }
    Ok(())
}

#[cfg(test)]
mod unit_testing {
    use super::*;
    use crate::dcfield::Field;
    use crate::dcparameter::{Parameter, SimpleParameter};
    use crate::dctype::DCTypeEnum;

    fn avatar_dcfile() -> (DCFile, usize) {
        let mut dcfile = DCFile::new();
        let class_idx = dcfile.add_class(DClass::new("Avatar", false, vec![])).unwrap();

        let mut hp = SimpleParameter::new(DCTypeEnum::TUInt16);
        hp.identifier = "hp".to_string();
        dcfile
            .add_field_to_class(
                class_idx,
                Field::new_parameter(Parameter::Primitive(hp), false, vec!["required".to_string(), "broadcast".to_string()]),
            )
            .unwrap();

        dcfile.build_all_inherited_fields();
        (dcfile, class_idx)
    }

    #[test]
    fn ai_format_update_matches_documented_layout() {
        let (dcfile, _) = avatar_dcfile();
        let dg = ai_format_update(0, 4200, 10, 5, &[DCValue::UInt(100)], &dcfile).unwrap();

        let mut expected = Datagram::new();
        expected.add_server_header(&[10], 5, STATESERVER_OBJECT_UPDATE_FIELD).unwrap();
        expected.add_u32(4200).unwrap();
        expected.add_u16(0).unwrap();
        expected.add_u16(100).unwrap();

        assert_eq!(dg.get_data(), expected.get_data());
    }

    #[test]
    fn ai_format_generate_switches_message_type_with_other_fields() {
        let (dcfile, class_idx) = avatar_dcfile();
        let dclass = dcfile.class(class_idx).unwrap();

        let without_other = ai_format_generate(dclass, 4200, 0, 1, 12, 5, &[DCValue::UInt(100)], &[], &dcfile).unwrap();
        let mut dgi = without_other.iterator();
        dgi.skip(1 + 8 + 8); // target count + one target channel + from channel
        assert_eq!(dgi.read_msg_type().unwrap(), STATESERVER_OBJECT_GENERATE_WITH_REQUIRED);

        let with_other = ai_format_generate(
            dclass,
            4200,
            0,
            1,
            12,
            5,
            &[DCValue::UInt(100)],
            &[(0, DCValue::UInt(50))],
            &dcfile,
        )
        .unwrap();
        let mut dgi = with_other.iterator();
        dgi.skip(1 + 8 + 8);
        assert_eq!(dgi.read_msg_type().unwrap(), STATESERVER_OBJECT_GENERATE_WITH_REQUIRED_OTHER);
    }

    #[test]
    fn ai_format_generate_rejects_wrong_required_arity() {
        let (dcfile, class_idx) = avatar_dcfile();
        let dclass = dcfile.class(class_idx).unwrap();
        let result = ai_format_generate(dclass, 4200, 0, 1, 12, 5, &[], &[], &dcfile);
        assert!(matches!(result, Err(EncodeError::WrongArity { expected: 1, got: 0 })));
    }
}
