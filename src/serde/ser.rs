use ::serde::Serialize;
use serde_json::Value as JsonValue;

use crate::constants::{INDEX_CLOSE, INDEX_OPEN, PART_SEPARATOR};
use crate::encode::writer::{check_name, Writer};
use crate::num::number::format_json_number;
use crate::options::EncodeOptions;
use crate::{Error, Result};

pub(crate) fn to_string<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    let value = serde_json::to_value(value).map_err(|err| Error::serialize(err.to_string()))?;
    let JsonValue::Object(map) = &value else {
        return Err(Error::serialize("top-level value must serialize to a map"));
    };
    let mut writer = Writer::new(options.clone());
    for (name, item) in map {
        check_name(name)?;
        write_value(&mut writer, name, item)?;
    }
    Ok(writer.finish())
}

/// `null` is written as nothing, so it reads back as a missing key.
fn write_value(writer: &mut Writer, key: &str, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Null => Ok(()),
        JsonValue::Bool(flag) => writer.write_pair(key, if *flag { "true" } else { "false" }),
        JsonValue::Number(number) => writer.write_pair(key, &format_json_number(number)),
        JsonValue::String(text) => writer.write_pair(key, text),
        JsonValue::Array(items) => {
            for (position, item) in items.iter().enumerate() {
                write_value(writer, &format!("{key}{INDEX_OPEN}{position}{INDEX_CLOSE}"), item)?;
            }
            Ok(())
        }
        JsonValue::Object(map) => {
            for (name, item) in map {
                check_name(name)?;
                write_value(writer, &format!("{key}{PART_SEPARATOR}{name}"), item)?;
            }
            Ok(())
        }
    }
}
