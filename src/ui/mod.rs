use iced::{
    widget::{button, column, progress_bar, scrollable, text, toggler, Space},
    Element, Length,
};

use crate::domain::InstallPhase;

const LICENSE_TEXT: &str = "END USER LICENSE AGREEMENT (EULA)

IMPORTANT: PLEASE READ THIS AGREEMENT CAREFULLY BEFORE INSTALLING OR USING THIS SOFTWARE.

This End User License Agreement (\"Agreement\") is a legal agreement between you (\"User\") and the software provider (\"BHUTUU\") for the StreetViewLocate application (\"Software\").

1. LICENSE GRANT
The Developer grants you a limited, non-exclusive, non-transferable license to install and use the Software for personal or internal business use.

2. RESTRICTIONS
You may not modify, reverse engineer, decompile, distribute, sublicense, rent, or lease the Software.

3. THIRD-PARTY SERVICES
The Software may integrate third-party services including Google Maps, Microsoft WebView2, and AutoCAD APIs. Use of such services is subject to their respective terms and conditions.

4. DISCLAIMER OF WARRANTY
The Software is provided \"AS IS\" without warranties of any kind, express or implied. The developer does not guarantee uninterrupted or error-free operation.

5. LIMITATION OF LIABILITY
In no event shall the Developer be liable for any indirect, incidental, special, or consequential damages arising out of the use or inability to use the Software.

6. TERMINATION
This Agreement is effective until terminated. It will terminate automatically if you fail to comply with its terms.

By clicking Install, you acknowledge that you have read, understood, and agree to be bound by this Agreement.

Author: Suman Kumar ~BHUTUU
Github: https://github.com/BHUTUU
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Welcome,
    License,
    Installing,
    /// Terminal page: finished, up to date, cancelled or failed
    Done { title: String, message: String },
}

/// Wizard state shown to the user
pub struct WizardView {
    pub page: Page,
    pub license_accepted: bool,
    pub warning: Option<String>,
    pub progress: f32,
    pub status_message: String,
    pub phase: InstallPhase,
}

impl Default for WizardView {
    fn default() -> Self {
        Self {
            page: Page::Welcome,
            license_accepted: false,
            warning: None,
            progress: 0.0,
            status_message: String::new(),
            phase: InstallPhase::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub enum WizardMessage {
    NextPressed,
    LicenseToggled(bool),
    InstallPressed,
    CancelPressed,
    FinishPressed,
}

impl WizardView {
    pub fn update(&mut self, message: &WizardMessage) {
        match message {
            WizardMessage::NextPressed => {
                self.page = Page::License;
            }
            WizardMessage::LicenseToggled(accepted) => {
                self.license_accepted = *accepted;
                if *accepted {
                    self.warning = None;
                }
            }
            WizardMessage::InstallPressed => {
                if !self.license_accepted {
                    self.warning = Some("You must accept the agreement.".to_string());
                }
                // Starting the pipeline is handled by the app
            }
            WizardMessage::CancelPressed => {
                self.status_message = "Cancelling...".to_string();
            }
            WizardMessage::FinishPressed => {}
        }
    }

    pub fn view(&self) -> Element<'_, WizardMessage> {
        match &self.page {
            Page::Welcome => self.welcome_page(),
            Page::License => self.license_page(),
            Page::Installing => self.install_page(),
            Page::Done { title, message } => self.done_page(title, message),
        }
    }

    fn welcome_page(&self) -> Element<'_, WizardMessage> {
        column![
            text("Welcome to StreetViewLocate Setup Wizard").size(28),
            Space::new().height(Length::Fixed(30.0)),
            text("This wizard will install StreetViewLocate for AutoCAD 2023 - 2025.").size(16),
            text("Click Next to continue.").size(16),
            Space::new().height(Length::Fixed(20.0)),
            button("Next")
                .on_press(WizardMessage::NextPressed)
                .padding([10, 20]),
        ]
        .padding(25)
        .spacing(10)
        .into()
    }

    fn license_page(&self) -> Element<'_, WizardMessage> {
        let warning = text(self.warning.as_deref().unwrap_or("")).size(14);

        column![
            text("License Agreement").size(24),
            scrollable(text(LICENSE_TEXT).size(13)).height(Length::Fixed(260.0)),
            toggler(self.license_accepted)
                .label("I accept the agreement")
                .on_toggle(WizardMessage::LicenseToggled),
            warning,
            button("Install")
                .on_press(WizardMessage::InstallPressed)
                .padding([10, 20]),
        ]
        .padding(25)
        .spacing(10)
        .into()
    }

    fn install_page(&self) -> Element<'_, WizardMessage> {
        let cancel = button("Cancel").padding([10, 20]);
        let cancel = if self.phase.is_terminal() {
            cancel
        } else {
            cancel.on_press(WizardMessage::CancelPressed)
        };

        column![
            text("Installing StreetViewLocate").size(24),
            Space::new().height(Length::Fixed(20.0)),
            progress_bar(0.0..=100.0, self.progress),
            text(&self.status_message).size(14),
            Space::new().height(Length::Fixed(10.0)),
            cancel,
        ]
        .padding(25)
        .spacing(10)
        .into()
    }

    fn done_page<'a>(&'a self, title: &'a str, message: &'a str) -> Element<'a, WizardMessage> {
        column![
            text(title).size(28),
            Space::new().height(Length::Fixed(20.0)),
            text(message).size(16),
            Space::new().height(Length::Fixed(20.0)),
            button("Finish")
                .on_press(WizardMessage::FinishPressed)
                .padding([10, 20]),
        ]
        .padding(25)
        .spacing(10)
        .into()
    }
}
