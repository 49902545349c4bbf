//! Registry hub XML → typed records.
//!
//! The hub answers with either a normal envelope
//! (`<response><header><resultCode>…</resultCode>…<body><items><item>…`) or,
//! for gateway-level failures, an `<OpenAPI_ServiceResponse>` carrying
//! `returnReasonCode` / `returnAuthMsg`. Both are handled here; anything the
//! core sees is already a [`RegistryItem`] with every field defaulted.

use std::collections::HashMap;

use jeonyu_core::RegistryItem;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

use crate::ClientError;

/// Result code the hub uses for success.
const SUCCESS_CODE: &str = "00";

/// One parsed page of a registry response.
#[derive(Debug, Default)]
pub struct RegistryPage {
    pub items: Vec<RegistryItem>,
    pub total_count: Option<usize>,
}

/// Parse a registry response body, failing on a non-success result code.
pub fn parse_registry_page(xml: &str) -> Result<RegistryPage, ClientError> {
    // Text is trimmed per element on close; trimming per event would eat the
    // spaces around entity references.
    let mut reader = Reader::from_str(xml);

    let mut header: HashMap<String, String> = HashMap::new();
    let mut items = Vec::new();
    let mut current: Option<HashMap<String, String>> = None;
    let mut tag: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "item" {
                    current = Some(HashMap::new());
                }
                tag = Some(name);
                text.clear();
            }
            Event::Text(e) => text.push_str(&e.decode()?),
            Event::CData(e) => text.push_str(&e.decode()?),
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    text.push(ch);
                } else if let Some(resolved) = resolve_predefined_entity(&e.decode()?) {
                    text.push_str(resolved);
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "item" {
                    if let Some(fields) = current.take() {
                        items.push(item_from_fields(&fields));
                    }
                } else if tag.as_deref() == Some(name.as_str()) {
                    let value = text.trim().to_string();
                    match current.as_mut() {
                        Some(fields) => {
                            fields.insert(name, value);
                        }
                        None => {
                            header.insert(name, value);
                        }
                    }
                }
                tag = None;
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    check_result_code(&header)?;

    let total_count = header.get("totalCount").and_then(|v| v.parse().ok());
    Ok(RegistryPage { items, total_count })
}

fn check_result_code(header: &HashMap<String, String>) -> Result<(), ClientError> {
    if let Some(code) = header.get("resultCode")
        && code != SUCCESS_CODE
    {
        return Err(ClientError::Api {
            code: code.clone(),
            message: header.get("resultMsg").cloned().unwrap_or_default(),
        });
    }
    if let Some(code) = header.get("returnReasonCode")
        && code != SUCCESS_CODE
    {
        let message = header
            .get("returnAuthMsg")
            .or_else(|| header.get("errMsg"))
            .cloned()
            .unwrap_or_default();
        return Err(ClientError::Api {
            code: code.clone(),
            message,
        });
    }
    Ok(())
}

fn item_from_fields(fields: &HashMap<String, String>) -> RegistryItem {
    let get = |tag: &str| fields.get(tag).cloned().unwrap_or_default();
    RegistryItem {
        floor_number: get("flrNo"),
        floor_number_label: get("flrNoNm"),
        floor_type_label: get("flrGbCdNm"),
        usage_text: get("mainPurpsCdNm"),
        usage_detail_text: get("etcPurps"),
        unit_label: get("hoNm"),
        building_name: get("dongNm"),
        area_classification_code: get("exposPubuseGbCd"),
        area_classification_label: get("exposPubuseGbCdNm"),
        area: get("area"),
        registry_pk: fields.get("mgmBldrgstPk").filter(|v| !v.is_empty()).cloned(),
    }
}
