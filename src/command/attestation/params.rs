// src/command/attestation/params.rs

//! URL-fragment parameters (`#k=v&k2=v2`), parsed and serialized with
//! `application/x-www-form-urlencoded` rules, plus the mapping between those
//! parameters and form fields.

use crate::command::attestation::surface::FormModel;
use crate::template::form_data::FieldDefinitions;
use crate::types::AUTO_PARAM;
use url::form_urlencoded;

/// Ordered fragment parameters. Lookups return the first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentParams {
    pairs: Vec<(String, String)>,
}

impl FragmentParams {
    /// Parse a bare fragment, with or without the leading `#`.
    pub fn parse(fragment: &str) -> Self {
        let s = fragment.strip_prefix('#').unwrap_or(fragment);
        let pairs = form_urlencoded::parse(s.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Take the fragment out of a full URL; input without `#` is treated as a
    /// bare fragment.
    pub fn from_url_or_fragment(s: &str) -> Self {
        match s.split_once('#') {
            Some((_, frag)) => Self::parse(frag),
            None => Self::parse(s),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// Replace the first occurrence and drop the others, or append.
    pub fn set(&mut self, name: &str, value: &str) {
        let mut replaced = false;
        self.pairs.retain_mut(|(k, v)| {
            if k != name {
                return true;
            }
            if replaced {
                return false;
            }
            *v = value.to_string();
            replaced = true;
            true
        });
        if !replaced {
            self.pairs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.pairs.retain(|(k, _)| k != name);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialized without the leading `#`.
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs.iter() {
            ser.append_pair(k, v);
        }
        ser.finish()
    }

    /// `#k=v&...`, or an empty string when there is nothing to share.
    pub fn to_fragment(&self) -> String {
        if self.pairs.is_empty() {
            String::new()
        } else {
            format!("#{}", self.to_query())
        }
    }
}

/// `(field_id, value)` for every visible, non-reason field present in the
/// parameters, in definition order.
pub fn field_values_from_params(
    defs: &FieldDefinitions,
    params: &FragmentParams,
) -> Vec<(String, String)> {
    defs.visible_fields()
        .filter_map(|d| {
            params
                .get(d.param_name())
                .map(|v| (d.field_id(), v.to_string()))
        })
        .collect()
}

/// Reason codes whose token (`alias ?? code`) appears in the reasons parameter.
pub fn reason_codes_from_params(defs: &FieldDefinitions, params: &FragmentParams) -> Vec<String> {
    let group = defs.reasons();
    let Some(raw) = params.get(group.param_name()) else {
        return Vec::new();
    };
    let wanted: Vec<&str> = raw.split(',').collect();

    group
        .items
        .iter()
        .filter(|i| wanted.contains(&i.param_name()))
        .map(|i| i.code.clone())
        .collect()
}

pub fn wants_auto_submit(params: &FragmentParams) -> bool {
    params.has(AUTO_PARAM)
}

/// Reasons parameter value for the currently checked controls.
pub fn reason_param_value(defs: &FieldDefinitions, form: &FormModel) -> String {
    defs.reasons()
        .items
        .iter()
        .filter(|i| form.reason(&i.code).map(|r| r.checked).unwrap_or(false))
        .map(|i| i.param_name())
        .collect::<Vec<_>>()
        .join(",")
}

// ======================================================
// Unit Tests
// ======================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::form_data::{default_form_data, parse_form_data_str};

    #[test]
    fn parse_decodes_plus_and_percent() {
        let p = FragmentParams::parse("#prenom=Jean+Pierre&ville=Saint-%C3%89tienne&auto");
        assert_eq!(p.get("prenom"), Some("Jean Pierre"));
        assert_eq!(p.get("ville"), Some("Saint-Étienne"));
        assert!(p.has("auto"));
        assert_eq!(p.get("auto"), Some(""));
        assert!(!p.has("nom"));
    }

    #[test]
    fn from_url_takes_fragment_only() {
        let p = FragmentParams::from_url_or_fragment("https://example.org/?nom=x#nom=Dupont");
        assert_eq!(p.get("nom"), Some("Dupont"));
        let p = FragmentParams::from_url_or_fragment("nom=Martin");
        assert_eq!(p.get("nom"), Some("Martin"));
    }

    #[test]
    fn get_returns_first_and_set_collapses_duplicates() {
        let mut p = FragmentParams::parse("a=1&b=2&a=3");
        assert_eq!(p.get("a"), Some("1"));
        p.set("a", "9");
        assert_eq!(p.to_query(), "a=9&b=2");
        p.set("c", "x y");
        assert_eq!(p.to_query(), "a=9&b=2&c=x+y");
        p.remove("b");
        assert_eq!(p.to_fragment(), "#a=9&c=x+y");
    }

    #[test]
    fn empty_params_serialize_to_empty_fragment() {
        let p = FragmentParams::parse("");
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
        assert_eq!(p.to_fragment(), "");
    }

    #[test]
    fn field_values_use_alias_and_skip_hidden() {
        let defs = default_form_data().unwrap();
        let p = FragmentParams::parse("prenom=Jean&firstname=ignored&datesortie=2020-01-01&cp=75001");
        let vals = field_values_from_params(&defs, &p);
        assert_eq!(
            vals,
            vec![
                ("field-firstname".to_string(), "Jean".to_string()),
                ("field-zipcode".to_string(), "75001".to_string()),
            ]
        );
    }

    #[test]
    fn reason_codes_use_item_alias() {
        let defs = default_form_data().unwrap();
        let p = FragmentParams::parse("raisons=t,s,unknown");
        assert_eq!(reason_codes_from_params(&defs, &p), vec!["travail", "sante"]);
    }

    #[test]
    fn reason_param_ignores_group_key() {
        let defs = default_form_data().unwrap();
        let p = FragmentParams::parse("reason=t");
        assert!(reason_codes_from_params(&defs, &p).is_empty());
    }

    #[test]
    fn reason_param_honours_group_alias() {
        let defs = parse_form_data_str(
            r#"[[ { key: "reason", alias: "why", items: [ { code: "work" }, { code: "shop", alias: "s" } ] } ]]"#,
        )
        .unwrap();
        let p = FragmentParams::parse("why=work,s&raisons=work");
        assert_eq!(reason_codes_from_params(&defs, &p), vec!["work", "shop"]);
        let p = FragmentParams::parse("raisons=work");
        assert!(reason_codes_from_params(&defs, &p).is_empty());
    }

    #[test]
    fn auto_flag() {
        assert!(wants_auto_submit(&FragmentParams::parse("auto")));
        assert!(wants_auto_submit(&FragmentParams::parse("x=1&auto=0")));
        assert!(!wants_auto_submit(&FragmentParams::parse("x=1")));
    }

    #[test]
    fn reason_param_value_lists_checked_tokens() {
        let defs = default_form_data().unwrap();
        let mut m = FormModel::from_definitions(&defs);
        assert_eq!(reason_param_value(&defs, &m), "");
        m.set_checked("sante", true).unwrap();
        m.set_checked("travail", true).unwrap();
        assert_eq!(reason_param_value(&defs, &m), "t,s");
    }
}
