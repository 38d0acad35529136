//! HTML pages for the prediction form.
//!
//! Every value that came from a request or an artifact goes through
//! [`escape`] before it is written into markup.

use crimecast_core::{FieldError, Hour, Month, Neighborhood, RawForm, Submission};
use crimecast_model::Prediction;

const TITLE: &str = "SF Crime Category Predictor";
const LATITUDE_LABEL: &str = "latitude(i.e., 37.733)";
const LONGITUDE_LABEL: &str = "longitude(i.e., -122.394)";

const ECHO_LABELS: [&str; 5] = ["Month", "Neighborhood", "Longitude", "Latitude", "Hour"];

// ── Public API ──

/// The input form, pre-filled from `form` with `errors` shown beside their fields.
pub fn index_page(form: &RawForm, errors: &[FieldError]) -> String {
    let mut body = String::new();
    body.push_str("<h2>Predict the most likely crime category</h2>\n");
    body.push_str("<form method=\"post\" action=\"/results\">\n");

    text_input(&mut body, "latitude", LATITUDE_LABEL, form.latitude.as_deref(), errors);
    text_input(&mut body, "longitude", LONGITUDE_LABEL, form.longitude.as_deref(), errors);

    let months: Vec<&str> = Month::ALL.iter().map(Month::as_str).collect();
    select(&mut body, "month", "Month", &months, form.month.as_deref(), errors);

    let hoods: Vec<&str> = Neighborhood::ALL.iter().map(Neighborhood::as_str).collect();
    select(
        &mut body,
        "neighborhood",
        "Neighborhood",
        &hoods,
        form.neighborhood.as_deref(),
        errors,
    );

    let hours: Vec<String> = Hour::all().map(|h| h.to_string()).collect();
    let hours: Vec<&str> = hours.iter().map(String::as_str).collect();
    select(&mut body, "hour", "Hour", &hours, form.hour.as_deref(), errors);

    body.push_str("<p><input type=\"submit\" value=\"Predict\"></p>\n");
    body.push_str("</form>\n");
    layout(TITLE, &body)
}

/// Echo of the collected fields, in submission order.
pub fn test_page(submission: &Submission) -> String {
    let mut body = String::new();
    body.push_str("<h2>Collected fields</h2>\n");
    data_table(&mut body, submission);
    body.push_str("<p><a href=\"/\">Back</a></p>\n");
    layout(TITLE, &body)
}

/// The predicted category with its probability as a percentage.
pub fn results_page(submission: &Submission, prediction: &Prediction) -> String {
    let mut body = String::new();
    body.push_str("<h2>Your input</h2>\n");
    data_table(&mut body, submission);
    body.push_str("<h2>Prediction</h2>\n");
    body.push_str(&format!(
        "<p>The most likely crime category is <strong class=\"prediction\">{}</strong> \
         with a probability of <strong class=\"probability\">{:.2}%</strong>.</p>\n",
        escape(&prediction.label),
        prediction.percent()
    ));
    body.push_str("<p><a href=\"/\">Try another</a></p>\n");
    layout(TITLE, &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h2>Something went wrong</h2>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Back</a></p>\n",
        escape(message)
    );
    layout(TITLE, &body)
}

// ── Building blocks ──

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

fn field_errors(out: &mut String, field: &str, errors: &[FieldError]) {
    let messages = RawForm::errors_for(errors, field);
    if messages.is_empty() {
        return;
    }
    out.push_str("<ul class=\"errors\">");
    for message in messages {
        out.push_str(&format!("<li>{}</li>", escape(message)));
    }
    out.push_str("</ul>\n");
}

fn text_input(
    out: &mut String,
    name: &str,
    label: &str,
    value: Option<&str>,
    errors: &[FieldError],
) {
    out.push_str(&format!(
        "<p><label for=\"{name}\">{}</label> <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\"></p>\n",
        escape(label),
        escape(value.unwrap_or_default())
    ));
    field_errors(out, name, errors);
}

fn select(
    out: &mut String,
    name: &str,
    label: &str,
    options: &[&str],
    selected: Option<&str>,
    errors: &[FieldError],
) {
    out.push_str(&format!(
        "<p><label for=\"{name}\">{}</label> <select id=\"{name}\" name=\"{name}\">",
        escape(label)
    ));
    for &option in options {
        let marker = if selected == Some(option) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{0}\"{marker}>{0}</option>",
            escape(option)
        ));
    }
    out.push_str("</select></p>\n");
    field_errors(out, name, errors);
}

fn data_table(out: &mut String, submission: &Submission) {
    out.push_str("<table class=\"data\">\n");
    for (label, value) in ECHO_LABELS.iter().zip(submission.data()) {
        out.push_str(&format!(
            "<tr><th>{label}</th><td>{}</td></tr>\n",
            escape(&value)
        ));
    }
    out.push_str("</table>\n");
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        RawForm {
            latitude: Some("37.733".into()),
            longitude: Some("-122.394".into()),
            month: Some("Aug".into()),
            neighborhood: Some("BAYVIEW".into()),
            hour: Some("5".into()),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("LARCENY/THEFT"), "LARCENY/THEFT");
    }

    #[test]
    fn index_lists_every_choice() {
        let page = index_page(&RawForm::default(), &[]);
        for month in Month::ALL {
            assert!(page.contains(&format!("<option value=\"{month}\">")));
        }
        for hood in Neighborhood::ALL {
            assert!(page.contains(&format!("<option value=\"{hood}\">")));
        }
        assert!(page.contains("<option value=\"1\">1</option>"));
        assert!(page.contains("<option value=\"24\">24</option>"));
        assert!(page.contains(LATITUDE_LABEL));
        assert!(page.contains(LONGITUDE_LABEL));
        assert!(!page.contains("class=\"errors\""));
    }

    #[test]
    fn index_keeps_previous_input_and_errors() {
        let form = RawForm {
            latitude: Some("\"><script>".into()),
            month: Some("May".into()),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        let page = index_page(&form, &errors);
        assert!(page.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(page.contains("<option value=\"May\" selected>May</option>"));
        assert!(page.contains("Not a valid float value."));
        assert!(page.contains("This field is required."));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_page_echoes_fields_in_order() {
        let page = test_page(&submission());
        let month = page.find("<td>Aug</td>").unwrap();
        let hood = page.find("<td>BAYVIEW</td>").unwrap();
        let lon = page.find("<td>-122.394</td>").unwrap();
        let lat = page.find("<td>37.733</td>").unwrap();
        let hour = page.find("<td>5</td>").unwrap();
        assert!(month < hood && hood < lon && lon < lat && lat < hour);
    }

    #[test]
    fn results_page_shows_label_and_percent() {
        let prediction = Prediction {
            label: "VEHICLE THEFT".into(),
            class_index: 2,
            probability: 0.4567,
        };
        let page = results_page(&submission(), &prediction);
        assert!(page.contains("<strong class=\"prediction\">VEHICLE THEFT</strong>"));
        assert!(page.contains("<strong class=\"probability\">45.67%</strong>"));
    }

    #[test]
    fn error_page_escapes_message() {
        let page = error_page("bad <artifact>");
        assert!(page.contains("bad &lt;artifact&gt;"));
    }
}
