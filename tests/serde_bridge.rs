use std::collections::BTreeMap;

use cfgbind::{BindOptions, EncodeOptions, ErrorKind};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    Admin,
    Guest,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    zip: Option<u32>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    age: u8,
    active: bool,
    role: Role,
    #[serde(default)]
    tags: Vec<String>,
    home: Address,
    #[serde(default)]
    limits: BTreeMap<String, f64>,
    note: Option<String>,
}

fn sample() -> User {
    User {
        name: "Ada".to_string(),
        age: 37,
        active: true,
        role: Role::Admin,
        tags: vec!["math".to_string(), "engines".to_string()],
        home: Address {
            city: "London".to_string(),
            zip: None,
        },
        limits: BTreeMap::from([("cpu".to_string(), 1.5)]),
        note: Some("first\nsecond".to_string()),
    }
}

#[rstest]
fn deserializes_with_case_insensitive_fields() {
    let text = "\
Name = Ada
AGE = 37
active = TRUE
role = ADMIN
tags = math, engines
Home.City = London
limits[cpu] = 1.5
note = {
first
second
}
";
    let user: User = cfgbind::from_str(text).unwrap();
    assert_eq!(user, sample());
}

#[rstest]
fn indexed_sequences_and_custom_separator() {
    let user: User = cfgbind::from_str(
        "name=a\nage=1\nactive=false\nrole=guest\nhome.city=x\ntags[1]=b\ntags[0]=a",
    )
    .unwrap();
    assert_eq!(user.tags, vec!["a", "b"]);
    assert_eq!(user.role, Role::Guest);

    let options = BindOptions::new().with_separator('|');
    let user: User = cfgbind::from_str_with_options(
        "name=a\nage=1\nactive=false\nrole=guest\nhome.city=x\ntags=a|b,c",
        &options,
    )
    .unwrap();
    assert_eq!(user.tags, vec!["a", "b,c"]);
}

#[rstest]
#[case("name=a\nage=old\nactive=true\nrole=admin\nhome.city=x")]
#[case("name=a\nage=1\nactive=true\nrole=root\nhome.city=x")]
#[case("name=a\nage=1\nactive=true\nrole=admin")]
#[case("name=a\nage=1\nactive=true\nrole=admin\nhome.city=x\ntags[1]=gap")]
#[case("name=a\nage=1\nactive=true\nrole=admin\nhome.city=x\ntags[100000000000]=far")]
#[case("name=a\nage=1\nactive=true\nrole=admin\nhome.city=x\ntags[18446744073709551615]=max")]
fn invalid_input_is_a_deserialize_error(#[case] text: &str) {
    let err = cfgbind::from_str::<User>(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialize);
}

#[rstest]
fn serializes_and_reads_back() {
    let text = cfgbind::to_string(&sample()).unwrap();
    assert_eq!(
        text,
        "name = Ada\nage = 37\nactive = true\nrole = admin\ntags[0] = math\ntags[1] = engines\n\
         home.city = London\nlimits.cpu = 1.5\nnote = {\nfirst\nsecond\n}\n"
    );
    let back: User = cfgbind::from_str(&text).unwrap();
    assert_eq!(back, sample());
}

#[rstest]
fn untyped_values_decode_as_strings() {
    let value: Value = cfgbind::from_str("a.b = 1\na.c[0] = x\na.c[1] = y\nd[k] = v").unwrap();
    assert_eq!(
        value,
        json!({"a": {"b": "1", "c": ["x", "y"]}, "d": {"k": "v"}})
    );
}

#[rstest]
fn reader_entry_point() {
    let value: Value = cfgbind::from_reader("x = {\n  y\n}\n".as_bytes()).unwrap();
    assert_eq!(value, json!({"x": "  y"}));
}

#[rstest]
fn compact_serialization() {
    let options = EncodeOptions::new().with_compact(true);
    let text = cfgbind::to_string_with_options(&json!({"a": [1, null, 2]}), &options).unwrap();
    assert_eq!(text, "a[0]=1\na[2]=2\n");
}
