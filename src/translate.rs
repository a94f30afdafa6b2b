use crate::catalog;
use crate::error::{Outcome, TranslatorError};
use crate::registry::BackendAddress;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use tracing::debug;

/// Encode everything in a query value except unreserved characters, so user
/// text can never introduce its own `&`, `=` or `|` delimiters
const QUERY_VALUE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'<').add(b'>').add(b'`')
    .add(b':').add(b'/').add(b'?').add(b'#').add(b'[').add(b']').add(b'@')
    .add(b'!').add(b'$').add(b'&').add(b'\'').add(b'(').add(b')')
    .add(b'*').add(b'+').add(b',').add(b';').add(b'=')
    .add(b'%').add(b'|').add(b'{').add(b'}').add(b'\\').add(b'^');

/// `/translate` response body
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "responseData")]
    response_data: TranslatedData,
}

#[derive(Debug, Deserialize)]
struct TranslatedData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Build `/translate?q=..&langpair=source|target` with both values percent-encoded
pub fn build_translate_url(address: &BackendAddress, text: &str, source: &str, target: &str) -> String {
    let langpair = format!("{}|{}", source, target);
    format!(
        "{}?q={}&langpair={}",
        address.endpoint("translate"),
        utf8_percent_encode(text, QUERY_VALUE_ENCODE_SET),
        utf8_percent_encode(&langpair, QUERY_VALUE_ENCODE_SET),
    )
}

/// Backends may HTML-escape punctuation in the translated text; callers get literal text
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Translate `text` on exactly one backend.
///
/// The pair is checked against a fresh catalog first; a backend that does
/// not list it fails with `PairNotFound` so failover can move on.
pub async fn translate_on(
    client: &reqwest::Client,
    address: &BackendAddress,
    text: &str,
    source: &str,
    target: &str,
) -> Outcome<String> {
    if !catalog::exists(client, address, source, target).await? {
        debug!("Backend {} does not offer {}-{}", address, source, target);
        return Err(TranslatorError::PairNotFound {
            source_lang: source.to_string(),
            target_lang: target.to_string(),
        });
    }

    let url = build_translate_url(address, text, source, target);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| TranslatorError::Connection(format!("{}: {}", address, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TranslatorError::BackendStatus {
            code: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| TranslatorError::Connection(format!("{}: {}", address, e)))?;

    let parsed: TranslateResponse = serde_json::from_slice(&body).map_err(|e| {
        TranslatorError::MalformedResponse(format!("translate from {}: {}", address, e))
    })?;

    Ok(unescape_html(&parsed.response_data.translated_text))
}
