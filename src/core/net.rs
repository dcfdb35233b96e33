use crate::core::CcassError;

/// Read the response body as text, mapping non-2xx statuses to
/// [`CcassError::Status`] before the body is consumed.
pub(crate) async fn ok_text(resp: reqwest::Response) -> Result<String, CcassError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(CcassError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(resp.text().await?)
}
