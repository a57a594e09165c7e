//! Form state machine for adding, editing and deleting payment methods
//!
//! ```text
//!            open_for_create            submit ok
//!   Idle ───────────────────▶ Composing ─────────▶ Submitting ──▶ Idle
//!    │                            ▲                    │
//!    │ open_for_edit              └──── remote error ──┘
//!    ▼
//!   Editing ──submit──▶ Submitting ──ok──▶ Idle
//! ```
//!
//! Every method takes `&self`, so the controller can be shared between the
//! tasks that deliver UI events. Locks are never held across a remote call;
//! the `Submitting` state is what keeps a second submit out.

use crate::config::PaydeskConfig;
use crate::core::classify::{classify_persisted, infer_active_tab};
use crate::core::draft::{Draft, DraftDefaults, DraftStore};
use crate::core::error::{PaydeskError, Result, StateError};
use crate::core::field::FieldValue;
use crate::core::method::{MethodKind, PaymentMethod};
use crate::core::schema;
use crate::core::service::PaymentMethodApi;
use crate::core::validation::validate_draft;
use crate::methods::merger::CollectionMerger;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Identifies the record an edit session will update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub kind: MethodKind,
    pub id: String,
}

/// What a submit will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EditTarget),
}

/// Where the form currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Modal closed
    Idle,
    /// Modal open for a new record
    Composing,
    /// Modal open on an existing record
    Editing(EditTarget),
    /// A create or update is in flight
    Submitting(FormMode),
}

impl FormState {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormState::Idle)
    }

    pub fn mode(&self) -> Option<FormMode> {
        match self {
            FormState::Idle => None,
            FormState::Composing => Some(FormMode::Create),
            FormState::Editing(target) => Some(FormMode::Edit(target.clone())),
            FormState::Submitting(mode) => Some(mode.clone()),
        }
    }

    fn edit_target(&self) -> Option<&EditTarget> {
        match self {
            FormState::Editing(target) | FormState::Submitting(FormMode::Edit(target)) => {
                Some(target)
            }
            _ => None,
        }
    }
}

impl From<FormMode> for FormState {
    fn from(mode: FormMode) -> Self {
        match mode {
            FormMode::Create => FormState::Composing,
            FormMode::Edit(target) => FormState::Editing(target),
        }
    }
}

/// Snapshot of everything the form needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub state: FormState,
    pub tab: MethodKind,
    /// Tab controls offered; only the edited variant while editing
    pub tabs: Vec<MethodKind>,
    pub draft: Draft,
}

impl FormView {
    pub fn is_editing(&self) -> bool {
        matches!(self.state.mode(), Some(FormMode::Edit(_)))
    }
}

struct Session {
    client_id: String,
    state: FormState,
    tab: MethodKind,
    drafts: DraftStore,
    deleting: HashSet<String>,
}

impl Session {
    fn tabs(&self) -> Vec<MethodKind> {
        match self.state.edit_target() {
            Some(target) => vec![target.kind],
            None => vec![MethodKind::Upi, MethodKind::Bank],
        }
    }

    /// Fail unless the modal is open and nothing is being submitted
    fn ensure_editable(&self) -> Result<(), StateError> {
        match self.state {
            FormState::Idle => Err(StateError::ModalClosed),
            FormState::Submitting(_) => Err(StateError::SubmitInFlight),
            FormState::Composing | FormState::Editing(_) => Ok(()),
        }
    }

    fn close(&mut self) {
        self.state = FormState::Idle;
        self.tab = self.drafts.defaults().kind;
        self.drafts.reset(&self.client_id);
    }
}

/// Orchestrates the form, the remote API and the merged list
pub struct MethodController {
    api: Arc<dyn PaymentMethodApi>,
    merger: CollectionMerger,
    session: Mutex<Session>,
}

impl MethodController {
    /// A controller for `client_id` using the stock draft defaults
    pub fn new(api: Arc<dyn PaymentMethodApi>, client_id: impl Into<String>) -> Self {
        Self::with_defaults(api, client_id, DraftDefaults::default())
    }

    pub fn from_config(
        api: Arc<dyn PaymentMethodApi>,
        client_id: impl Into<String>,
        config: &PaydeskConfig,
    ) -> Self {
        Self::with_defaults(api, client_id, config.draft_defaults())
    }

    pub fn with_defaults(
        api: Arc<dyn PaymentMethodApi>,
        client_id: impl Into<String>,
        defaults: DraftDefaults,
    ) -> Self {
        let client_id = client_id.into();
        let tab = defaults.kind;
        Self {
            merger: CollectionMerger::new(api.clone()),
            api,
            session: Mutex::new(Session {
                drafts: DraftStore::initialize(&client_id, defaults),
                client_id,
                state: FormState::Idle,
                tab,
                deleting: HashSet::new(),
            }),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|e| PaydeskError::Internal(format!("Failed to acquire session lock: {}", e)))
    }

    // === Queries ===

    pub fn client_id(&self) -> Result<String> {
        Ok(self.session()?.client_id.clone())
    }

    pub fn state(&self) -> Result<FormState> {
        Ok(self.session()?.state.clone())
    }

    pub fn active_tab(&self) -> Result<MethodKind> {
        Ok(self.session()?.tab)
    }

    /// Tab controls to offer in the current mode
    pub fn available_tabs(&self) -> Result<Vec<MethodKind>> {
        Ok(self.session()?.tabs())
    }

    pub fn draft(&self) -> Result<Draft> {
        Ok(self.session()?.drafts.draft().clone())
    }

    pub fn view(&self) -> Result<FormView> {
        let session = self.session()?;
        Ok(FormView {
            state: session.state.clone(),
            tab: session.tab,
            tabs: session.tabs(),
            draft: session.drafts.draft().clone(),
        })
    }

    /// The whole merged list, inactive records included
    pub fn methods(&self) -> Vec<PaymentMethod> {
        self.merger.snapshot()
    }

    /// Records rendered in the grid
    pub fn active_methods(&self) -> Vec<PaymentMethod> {
        self.merger.active()
    }

    // === Client context ===

    /// Switch the active client, carrying the open draft along
    ///
    /// The merged list belongs to the previous client, so it is dropped and
    /// any refresh still running for that client is ignored.
    pub fn select_client(&self, client_id: impl Into<String>) -> Result<()> {
        let client_id = client_id.into();
        let mut session = self.session()?;
        if session.client_id != client_id {
            info!(from = %session.client_id, to = %client_id, "Active client changed");
            self.merger.clear();
        }
        session.drafts.sync_client(&client_id);
        session.client_id = client_id;
        Ok(())
    }

    /// Reload the merged list for the active client
    pub async fn refresh(&self) -> Result<Vec<PaymentMethod>> {
        let client_id = self.client_id()?;
        Ok(self.merger.fetch(&client_id).await?)
    }

    // === Modal transitions ===

    pub fn open_for_create(&self) -> Result<()> {
        let mut session = self.session()?;
        match session.state {
            FormState::Idle => {}
            FormState::Submitting(_) => return Err(StateError::SubmitInFlight.into()),
            _ => return Err(StateError::ModalAlreadyOpen.into()),
        }

        let session = &mut *session;
        let kind = session.drafts.defaults().kind;
        session.tab = kind;
        session.drafts.reset_as(kind, &session.client_id);
        session.state = FormState::Composing;
        debug!(tab = %kind, "Form opened for create");
        Ok(())
    }

    pub fn open_for_edit(&self, record: &PaymentMethod) -> Result<()> {
        let kind = classify_persisted(record)?;

        let mut session = self.session()?;
        match session.state {
            FormState::Idle => {}
            FormState::Submitting(_) => return Err(StateError::SubmitInFlight.into()),
            _ => return Err(StateError::ModalAlreadyOpen.into()),
        }

        let session = &mut *session;
        let draft = Draft::from_method(record);
        let tab = infer_active_tab(&draft, kind);

        session.drafts.load(draft);
        session.drafts.sync_client(&session.client_id);
        session.tab = tab;
        session.state = FormState::Editing(EditTarget {
            kind,
            id: record.id().to_string(),
        });
        debug!(tab = %tab, id = record.id(), "Form opened for edit");
        Ok(())
    }

    /// Switch tabs, clearing the draft for the newly selected variant
    pub fn change_tab(&self, index: usize) -> Result<()> {
        let kind = MethodKind::from_tab_index(index).ok_or(StateError::InvalidTab { index })?;

        let mut session = self.session()?;
        if matches!(session.state, FormState::Submitting(_)) {
            return Err(StateError::SubmitInFlight.into());
        }
        if !session.tabs().contains(&kind) {
            return Err(StateError::TabUnavailable { kind }.into());
        }

        let session = &mut *session;
        session.tab = kind;
        session.drafts.reset_as(kind, &session.client_id);
        debug!(tab = %kind, "Tab changed");
        Ok(())
    }

    pub fn field_changed(&self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let mut session = self.session()?;
        session.ensure_editable()?;
        session.drafts.patch(name, value.into())?;
        Ok(())
    }

    /// Close the modal and discard the draft
    pub fn close_modal(&self) -> Result<()> {
        let mut session = self.session()?;
        if matches!(session.state, FormState::Submitting(_)) {
            return Err(StateError::SubmitInFlight.into());
        }
        if session.state.is_open() {
            session.close();
            debug!("Form closed");
        }
        Ok(())
    }

    // === Remote operations ===

    /// Upload a QR image and attach its reference to the UPI draft
    pub async fn upload_qr(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        {
            let session = self.session()?;
            session.ensure_editable()?;
            if session.drafts.kind() != MethodKind::Upi {
                return Err(StateError::NotUpiDraft.into());
            }
        }

        let reference = self
            .api
            .upload_image(file_name, bytes)
            .await
            .inspect_err(|e| warn!(file_name, error = %e, "QR upload failed"))?;

        let mut session = self.session()?;
        if let Err(e) = session.ensure_editable() {
            warn!(reference = %reference, "Form changed during QR upload, discarding reference");
            return Err(e.into());
        }
        if session.drafts.kind() != MethodKind::Upi {
            return Err(StateError::NotUpiDraft.into());
        }
        session
            .drafts
            .patch(schema::QR_CODE, FieldValue::String(reference.clone()))?;
        info!(reference = %reference, "QR code attached to draft");
        Ok(reference)
    }

    /// Create or update the draft remotely
    ///
    /// On success the merged list is updated, the modal closes and the draft
    /// resets. On failure the form returns to where it was with the draft
    /// intact. Validation failures never reach the remote API.
    pub async fn submit(&self) -> Result<PaymentMethod> {
        let (mode, input) = {
            let mut session = self.session()?;
            session.ensure_editable()?;

            let session = &mut *session;
            session.drafts.sync_client(&session.client_id);
            let draft = session.drafts.draft();
            validate_draft(draft)?;

            let mode = match session.state.mode() {
                Some(mode) => mode,
                None => return Err(StateError::ModalClosed.into()),
            };
            if let FormMode::Edit(target) = &mode {
                if target.kind != draft.kind() {
                    return Err(StateError::TabUnavailable { kind: draft.kind() }.into());
                }
            }

            let input = draft.to_input();
            session.state = FormState::Submitting(mode.clone());
            (mode, input)
        };

        let guard = SubmitGuard {
            session: &self.session,
            resume: Some(mode.clone()),
        };
        let kind = input.kind();

        let result = match &mode {
            FormMode::Create => self.api.create_method(input).await,
            FormMode::Edit(target) => self.api.update_method(&target.id, input).await,
        };

        match result {
            Ok(record) => {
                match &mode {
                    FormMode::Create => {
                        info!(kind = %kind, id = record.id(), "Payment method created");
                        self.merger.append(record.clone());
                    }
                    FormMode::Edit(target) => {
                        info!(kind = %kind, id = %target.id, "Payment method updated");
                        self.merger.replace(record.clone());
                    }
                }
                guard.finish();
                Ok(record)
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Payment method submit failed");
                drop(guard);
                Err(e.into())
            }
        }
    }

    /// Delete a record remotely and drop it from the merged list
    pub async fn delete_record(&self, record: &PaymentMethod) -> Result<()> {
        let kind = record.kind();
        let id = record.id().to_string();

        let client_id = {
            let mut session = self.session()?;
            if !session.deleting.insert(id.clone()) {
                return Err(StateError::DeleteInFlight { id }.into());
            }
            session.client_id.clone()
        };
        let _guard = DeleteGuard {
            session: &self.session,
            id: &id,
        };

        match self.api.delete_method(kind, &id, &client_id).await {
            Ok(()) => {
                let removed = self.merger.remove(kind, &id);
                info!(kind = %kind, id = %id, removed, "Payment method deleted");
                Ok(())
            }
            Err(e) => {
                warn!(kind = %kind, id = %id, error = %e, "Payment method delete failed");
                Err(e.into())
            }
        }
    }
}

/// Puts the form back into its pre-submit state unless the submit finished
///
/// Covers both remote failures and a submit future dropped mid-flight.
struct SubmitGuard<'a> {
    session: &'a Mutex<Session>,
    resume: Option<FormMode>,
}

impl SubmitGuard<'_> {
    fn finish(mut self) {
        self.resume = None;
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        session.close();
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if let Some(mode) = self.resume.take() {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(session.state, FormState::Submitting(_)) {
                debug!("Restoring form after unfinished submit");
                session.state = mode.into();
            }
        }
    }
}

/// Clears the in-flight marker for a delete however it ends
struct DeleteGuard<'a> {
    session: &'a Mutex<Session>,
    id: &'a str,
}

impl Drop for DeleteGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        session.deleting.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ClassificationError, RemoteError};
    use crate::core::method::{BankDetails, CommonFields, MethodInput, Timestamps, UpiDetails};
    use crate::storage::InMemoryPaymentMethodApi;

    fn controller() -> (Arc<InMemoryPaymentMethodApi>, MethodController) {
        let api = Arc::new(InMemoryPaymentMethodApi::new());
        let controller = MethodController::new(api.clone(), "c1");
        (api, controller)
    }

    fn upi_record(id: &str) -> PaymentMethod {
        MethodInput::Upi {
            common: CommonFields::blank("c1", vec!["Monday".into()], vec!["January".into()]),
            upi: UpiDetails {
                upi_id: "shop@okaxis".into(),
                qr_code: String::new(),
            },
        }
        .into_method(id, Timestamps::default())
    }

    #[test]
    fn test_starts_idle_on_default_tab() {
        let (_, controller) = controller();
        let view = controller.view().unwrap();

        assert_eq!(view.state, FormState::Idle);
        assert_eq!(view.tab, MethodKind::Upi);
        assert_eq!(view.tabs, vec![MethodKind::Upi, MethodKind::Bank]);
        assert_eq!(view.draft.common.client_id, "c1");
    }

    #[test]
    fn test_field_changes_need_an_open_form() {
        let (_, controller) = controller();
        let err = controller.field_changed("upiId", "a@okaxis").unwrap_err();
        assert!(matches!(err, PaydeskError::State(StateError::ModalClosed)));
    }

    #[test]
    fn test_open_twice_is_rejected() {
        let (_, controller) = controller();
        controller.open_for_create().unwrap();
        assert!(matches!(
            controller.open_for_create(),
            Err(PaydeskError::State(StateError::ModalAlreadyOpen))
        ));
    }

    #[test]
    fn test_change_tab_resets_draft() {
        let (_, controller) = controller();
        controller.open_for_create().unwrap();
        controller.field_changed("upiId", "a@okaxis").unwrap();

        controller.change_tab(1).unwrap();

        let draft = controller.draft().unwrap();
        assert_eq!(draft.kind(), MethodKind::Bank);
        assert_eq!(draft.account_no(), Some(""));
        assert!(matches!(
            controller.change_tab(7),
            Err(PaydeskError::State(StateError::InvalidTab { index: 7 }))
        ));
    }

    #[test]
    fn test_edit_locks_tabs_to_record_kind() {
        let (_, controller) = controller();
        controller.open_for_edit(&upi_record("u1")).unwrap();

        let view = controller.view().unwrap();
        assert!(view.is_editing());
        assert_eq!(view.tabs, vec![MethodKind::Upi]);
        assert_eq!(view.draft.id.as_deref(), Some("u1"));
        assert!(matches!(
            controller.change_tab(MethodKind::Bank.tab_index()),
            Err(PaydeskError::State(StateError::TabUnavailable {
                kind: MethodKind::Bank
            }))
        ));
    }

    #[test]
    fn test_edit_of_unclassifiable_record_fails() {
        let (_, controller) = controller();
        let record = MethodInput::Bank {
            common: CommonFields::blank("c1", vec![], vec![]),
            bank: BankDetails::default(),
        }
        .into_method("b1", Timestamps::default());

        let err = controller.open_for_edit(&record).unwrap_err();
        assert!(matches!(
            err,
            PaydeskError::Classification(ClassificationError::Unclassifiable)
        ));
        assert_eq!(controller.state().unwrap(), FormState::Idle);
    }

    #[test]
    fn test_close_resets_draft() {
        let (_, controller) = controller();
        controller.open_for_create().unwrap();
        controller.field_changed("beneficiaryName", "Asha").unwrap();

        controller.close_modal().unwrap();

        assert_eq!(controller.state().unwrap(), FormState::Idle);
        assert_eq!(controller.draft().unwrap().common.beneficiary_name, "");
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_api() {
        let (api, controller) = controller();
        controller.open_for_create().unwrap();
        controller.field_changed("upiId", "not-a-handle").unwrap();

        let err = controller.submit().await.unwrap_err();

        assert!(matches!(err, PaydeskError::Validation(_)));
        assert_eq!(api.count(MethodKind::Upi), 0);
        assert_eq!(controller.state().unwrap(), FormState::Composing);
    }

    #[tokio::test]
    async fn test_upload_requires_upi_draft() {
        let (_, controller) = controller();
        controller.open_for_create().unwrap();
        controller.change_tab(1).unwrap();

        let err = controller.upload_qr("qr.png", vec![1]).await.unwrap_err();
        assert!(matches!(err, PaydeskError::State(StateError::NotUpiDraft)));
    }

    #[tokio::test]
    async fn test_upload_attaches_reference() {
        let (api, controller) = controller();
        controller.open_for_create().unwrap();

        let reference = controller.upload_qr("qr.png", vec![9, 9]).await.unwrap();

        let draft = controller.draft().unwrap();
        match draft.variant {
            crate::core::draft::DraftVariant::Upi { details } => {
                assert_eq!(details.qr_code, reference)
            }
            _ => panic!("expected a upi draft"),
        }
        assert_eq!(api.image(&reference), Some(vec![9, 9]));
    }

    #[tokio::test]
    async fn test_delete_missing_record_keeps_list() {
        let (api, controller) = controller();
        let record = upi_record("ghost");
        api.insert(upi_record("kept")).unwrap();
        controller.refresh().await.unwrap();

        let err = controller.delete_record(&record).await.unwrap_err();

        assert!(matches!(
            err,
            PaydeskError::Remote(RemoteError::NotFound { .. })
        ));
        assert_eq!(controller.methods().len(), 1);
    }
}
