pub(crate) mod writer;

use tracing::{debug, trace};

use crate::bind::{Bindable, Configurable, View};
use crate::constants::{INDEX_CLOSE, INDEX_OPEN, PART_SEPARATOR};
use crate::options::EncodeOptions;
use crate::Result;

use writer::{check_index, check_name, Writer};

/// Writes `target` as configuration text that populates an equal value.
///
/// Members come out in declaration order, one `key = value` per leaf.
/// Absent values and members marked `ignore_get` are left out.
pub fn to_config_string(target: &dyn Configurable, options: &EncodeOptions) -> Result<String> {
    let mut writer = Writer::new(options.clone());
    write_object(&mut writer, "", target)?;
    debug!(
        target = target.type_name(),
        pairs = writer.len(),
        "encoded configuration"
    );
    Ok(writer.finish())
}

pub fn to_config_string_default(target: &dyn Configurable) -> Result<String> {
    to_config_string(target, &EncodeOptions::default())
}

fn write_object(writer: &mut Writer, prefix: &str, object: &dyn Configurable) -> Result<()> {
    for member in object.members() {
        if member.policy.ignore_get {
            continue;
        }
        let Some(value) = object.member(member.field) else {
            continue;
        };
        check_name(member.name)?;
        let key = if prefix.is_empty() {
            member.name.to_string()
        } else {
            format!("{prefix}{PART_SEPARATOR}{}", member.name)
        };
        write_value(writer, &key, value)?;
    }
    if let Some(indexer) = object.indexer_ref() {
        if prefix.is_empty() {
            trace!(target = object.type_name(), "indexer entries need an enclosing key");
            return Ok(());
        }
        for (index, item) in indexer.entries() {
            write_value(writer, &indexed(prefix, &index)?, item)?;
        }
    }
    Ok(())
}

fn write_value(writer: &mut Writer, key: &str, value: &dyn Bindable) -> Result<()> {
    match value.view() {
        View::Absent => Ok(()),
        View::Text(text) => writer.write_pair(key, &text),
        View::Object(object) => write_object(writer, key, object),
        View::Typed { type_name, object } => {
            writer.write_pair(key, type_name)?;
            write_object(writer, key, object)
        }
        // A blank value reads back as a cleared list, so an empty list inside
        // a map entry still creates that entry.
        View::List(items) if items.is_empty() => writer.write_pair(key, ""),
        View::List(items) => {
            for (position, item) in items.into_iter().enumerate() {
                let mut buffer = itoa::Buffer::new();
                write_value(writer, &indexed(key, buffer.format(position))?, item)?;
            }
            Ok(())
        }
        View::Map(entries) => {
            for (index, item) in entries {
                write_value(writer, &indexed(key, &index)?, item)?;
            }
            Ok(())
        }
    }
}

fn indexed(key: &str, index: &str) -> Result<String> {
    check_index(index)?;
    Ok(format!("{key}{INDEX_OPEN}{index}{INDEX_CLOSE}"))
}
