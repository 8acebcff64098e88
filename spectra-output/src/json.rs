use serde::Serialize;

use crate::{OutputError, OutputResponse};

pub const CONTENT_TYPE: &str = "application/json";

pub fn output<T: Serialize>(value: &T) -> Result<OutputResponse, OutputError> {
    Ok(OutputResponse {
        body: serde_json::to_vec(value)?,
        content_type: CONTENT_TYPE,
        content_disposition: "inline".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use spectra_catalog::FieldValue;
    use spectra_core::SpectrumDocument;

    use super::*;

    #[test]
    fn test_document_output() {
        let mut zall_pix_info = IndexMap::new();
        zall_pix_info.insert("TARGETID".to_string(), FieldValue::Int(39633345008634311));
        zall_pix_info.insert("Z".to_string(), FieldValue::Null);
        let mut scores = IndexMap::new();
        scores.insert("TSNR2_ELG".to_string(), FieldValue::Float(1.5));
        let mut data = IndexMap::new();
        data.insert(
            "b_wavelength".to_string(),
            vec![FieldValue::Float(3600.0), FieldValue::Float(3600.8)],
        );
        data.insert("b_mask".to_string(), vec![FieldValue::Int(0), FieldValue::Int(1)]);

        let document = SpectrumDocument {
            zall_pix_info,
            scores,
            data,
        };
        let response = output(&document).unwrap();

        assert_eq!(response.content_type, "application/json");
        assert_eq!(
            String::from_utf8(response.body).unwrap(),
            r#"{"zall_pix_info":{"TARGETID":39633345008634311,"Z":null},"scores":{"TSNR2_ELG":1.5},"data":{"b_wavelength":[3600.0,3600.8],"b_mask":[0,1]}}"#
        );
    }
}
