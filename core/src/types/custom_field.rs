use crate::codec::{Emit, Field, Resource, Slot};
use crate::keys;

/// A custom field value as it appears on an issue or a group.
///
/// `value` holds one entry for single-value fields and one per selection when
/// `multiple` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueCustomField {
    pub id: i32,
    pub name: Option<String>,
    pub multiple: Option<bool>,
    pub values: Vec<String>,
}

static FIELDS: &[Field<IssueCustomField>] = &[
    Field {
        key: keys::ID,
        slot: Slot::Int(|c| c.id, |c, v| c.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::NAME,
        slot: Slot::Text(|c| c.name.as_deref(), |c, v| c.name = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::MULTIPLE,
        slot: Slot::Bool(|c| c.multiple, |c, v| c.multiple = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::VALUE,
        slot: Slot::Values(|c| c.values.as_slice(), |c, v| c.values = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for IssueCustomField {
    const KEY: &'static str = keys::CUSTOM_FIELD;
    const COLLECTION_KEY: Option<&'static str> = None;

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::json;
    use crate::codec::xml::{parse_document, read_object};
    use serde_json::json;

    #[test]
    fn single_value_from_attributes_and_text() {
        let root =
            parse_document(r#"<custom_field id="2" name="Department"><value>R&amp;D</value></custom_field>"#)
                .unwrap();
        let field: IssueCustomField = read_object(&root).unwrap();
        assert_eq!(field.id, 2);
        assert_eq!(field.values, vec!["R&D".to_string()]);
    }

    #[test]
    fn multiple_values_from_xml_array() {
        let root = parse_document(
            r#"<custom_field id="4" name="Platforms" multiple="true">
  <value type="array"><value>Linux</value><value>Windows</value></value>
</custom_field>"#,
        )
        .unwrap();
        let field: IssueCustomField = read_object(&root).unwrap();
        assert_eq!(field.multiple, Some(true));
        assert_eq!(field.values, vec!["Linux".to_string(), "Windows".to_string()]);
    }

    #[test]
    fn json_value_may_be_scalar_or_array() {
        let single = json!({"id": 2, "value": "R&D"});
        let many = json!({"id": 4, "multiple": true, "value": ["Linux", "Windows"]});
        let single: IssueCustomField = json::read_object(single.as_object().unwrap()).unwrap();
        let many: IssueCustomField = json::read_object(many.as_object().unwrap()).unwrap();
        assert_eq!(single.values, vec!["R&D".to_string()]);
        assert_eq!(many.values.len(), 2);
    }
}
