use crate::dtos::{GenerateRequest, GenerateResponse};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Where the form is in its submit cycle. Success and failure both return
/// to `Idle`; their outcome lands in the form's result/error fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
}

/// What the user has typed/toggled, separate from the submit cycle.
#[derive(Debug, Clone, Default)]
pub struct FormSettings {
    pub prompt: String,
    pub api_key: String,
    pub edit_mode: bool,
}

/// The studio form: prompt/key/edit-mode settings, the current source
/// image, the last generated result, and the last error.
///
/// Transitions happen through explicit events (`submit`, `resolve`,
/// `load_source_image`, `refine_generated`, `set_edit_mode`) so the form
/// can never be simultaneously loading and showing a stale error.
#[derive(Debug, Default)]
pub struct ImageForm {
    phase: FormPhase,
    settings: FormSettings,
    source_image: Option<String>,
    generated: Option<GenerateResponse>,
    error: Option<String>,
}

impl ImageForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn edit_mode(&self) -> bool {
        self.settings.edit_mode
    }

    pub fn prompt(&self) -> &str {
        &self.settings.prompt
    }

    /// The source image data URI attached to the next edit request, if any.
    pub fn source_image(&self) -> Option<&str> {
        self.source_image.as_deref()
    }

    /// The currently displayed generated image, if any.
    pub fn generated_image(&self) -> Option<&str> {
        self.generated.as_ref().map(|r| r.image.as_str())
    }

    pub fn caption(&self) -> Option<&str> {
        self.generated.as_ref().map(|r| r.text.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.settings.prompt = prompt.into();
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.settings.api_key = api_key.into();
    }

    /// Begin a submission. Blank prompt or key is rejected locally: the
    /// error is recorded and no request is produced. Otherwise the form
    /// moves to `Submitting` and yields the request to send; a form already
    /// submitting yields nothing.
    pub fn submit(&mut self) -> Option<GenerateRequest> {
        if self.phase == FormPhase::Submitting {
            return None;
        }

        if self.settings.prompt.trim().is_empty() {
            self.error = Some("Please enter a prompt".to_string());
            return None;
        }

        if self.settings.api_key.trim().is_empty() {
            self.error = Some("Please enter your Gemini API key".to_string());
            return None;
        }

        self.error = None;
        self.phase = FormPhase::Submitting;

        let mut request = GenerateRequest::new(self.settings.prompt.clone());
        request.api_key = Some(self.settings.api_key.clone());
        if self.settings.edit_mode {
            request.edit_image = self.source_image.clone();
        }

        Some(request)
    }

    /// Finish a submission. Success stores the result for display and, in
    /// edit mode, promotes it to be the next source image so refinements
    /// chain. Failure records the message and leaves the previously
    /// displayed image untouched.
    pub fn resolve(&mut self, outcome: Result<GenerateResponse, String>) {
        self.phase = FormPhase::Idle;

        match outcome {
            Ok(result) => {
                if self.settings.edit_mode {
                    self.source_image = Some(result.image.clone());
                }
                self.generated = Some(result);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// Load a local image as the edit source, switching edit mode on.
    pub fn load_source_image(&mut self, mime_type: &str, bytes: &[u8]) {
        let data_uri = format!("data:{};base64,{}", mime_type, BASE64.encode(bytes));
        self.load_source_data_uri(data_uri);
    }

    pub fn load_source_data_uri(&mut self, data_uri: String) {
        self.source_image = Some(data_uri);
        self.settings.edit_mode = true;
    }

    /// Promote the freshly generated image into edit mode with a cleared
    /// prompt, ready for a refinement instruction. No-op when nothing has
    /// been generated yet.
    pub fn refine_generated(&mut self) {
        if let Some(result) = &self.generated {
            self.source_image = Some(result.image.clone());
            self.settings.edit_mode = true;
            self.settings.prompt.clear();
        }
    }

    /// Turning edit mode off always discards the source image, so toggling
    /// off and back on never resurrects a stale source.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        if enabled {
            self.settings.edit_mode = true;
        } else {
            self.reset_edit_mode();
        }
    }

    pub fn reset_edit_mode(&mut self) {
        self.settings.edit_mode = false;
        self.source_image = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_form() -> ImageForm {
        let mut form = ImageForm::new();
        form.set_prompt("a red bicycle");
        form.set_api_key("test-key");
        form
    }

    fn result(image: &str, text: &str) -> GenerateResponse {
        GenerateResponse {
            image: image.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn blank_prompt_is_rejected_locally() {
        let mut form = ImageForm::new();
        form.set_api_key("test-key");
        form.set_prompt("   ");

        assert!(form.submit().is_none());
        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.error(), Some("Please enter a prompt"));
    }

    #[test]
    fn blank_api_key_is_rejected_locally() {
        let mut form = ImageForm::new();
        form.set_prompt("a red bicycle");

        assert!(form.submit().is_none());
        assert_eq!(form.error(), Some("Please enter your Gemini API key"));
    }

    #[test]
    fn submit_moves_to_submitting_and_clears_error() {
        let mut form = ready_form();
        form.set_prompt("");
        form.submit();
        assert!(form.error().is_some());

        form.set_prompt("a red bicycle");
        let request = form.submit().expect("expected a request");

        assert_eq!(form.phase(), FormPhase::Submitting);
        assert!(form.error().is_none());
        assert_eq!(request.prompt, "a red bicycle");
        assert_eq!(request.api_key.as_deref(), Some("test-key"));
        assert!(request.edit_image.is_none());
    }

    #[test]
    fn no_overlapping_submissions() {
        let mut form = ready_form();
        assert!(form.submit().is_some());
        assert!(form.submit().is_none());
    }

    #[test]
    fn edit_mode_attaches_source_image() {
        let mut form = ready_form();
        form.load_source_data_uri("data:image/png;base64,QUJD".to_string());

        let request = form.submit().expect("expected a request");
        assert_eq!(
            request.edit_image.as_deref(),
            Some("data:image/png;base64,QUJD")
        );
    }

    #[test]
    fn success_in_edit_mode_promotes_result_to_source() {
        let mut form = ready_form();
        form.load_source_data_uri("data:image/png;base64,QUJD".to_string());
        form.submit().expect("expected a request");

        form.resolve(Ok(result("data:image/png;base64,REVG", "done")));

        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.generated_image(), Some("data:image/png;base64,REVG"));
        assert_eq!(form.source_image(), Some("data:image/png;base64,REVG"));
        assert_eq!(form.caption(), Some("done"));
    }

    #[test]
    fn success_outside_edit_mode_leaves_source_empty() {
        let mut form = ready_form();
        form.submit().expect("expected a request");
        form.resolve(Ok(result("data:image/png;base64,REVG", "")));

        assert!(form.source_image().is_none());
        assert_eq!(form.generated_image(), Some("data:image/png;base64,REVG"));
    }

    #[test]
    fn failure_keeps_previously_displayed_image() {
        let mut form = ready_form();
        form.submit().expect("expected a request");
        form.resolve(Ok(result("data:image/png;base64,REVG", "")));

        form.submit().expect("expected a request");
        form.resolve(Err("upstream exploded".to_string()));

        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.error(), Some("upstream exploded"));
        assert_eq!(form.generated_image(), Some("data:image/png;base64,REVG"));
    }

    #[test]
    fn refine_promotes_generated_and_clears_prompt() {
        let mut form = ready_form();
        form.submit().expect("expected a request");
        form.resolve(Ok(result("data:image/png;base64,REVG", "")));

        form.refine_generated();

        assert!(form.edit_mode());
        assert_eq!(form.source_image(), Some("data:image/png;base64,REVG"));
        assert!(form.prompt().is_empty());
    }

    #[test]
    fn toggling_edit_mode_off_and_on_clears_stale_source() {
        let mut form = ready_form();
        form.load_source_image("image/png", b"abc");
        assert!(form.source_image().is_some());

        form.set_edit_mode(false);
        form.set_edit_mode(true);

        assert!(form.edit_mode());
        assert!(form.source_image().is_none());
    }

    #[test]
    fn load_source_image_builds_data_uri() {
        let mut form = ready_form();
        form.load_source_image("image/png", b"ABC");

        assert!(form.edit_mode());
        assert_eq!(form.source_image(), Some("data:image/png;base64,QUJD"));
    }
}
