use super::*;
use crate::error::{GitHubResult, HandlerErrorCode};
use crate::github::{CreateRepository, RepositoryOwner, UpdateRepository};
use crate::model::{AccessToken, SecurityAndAnalysis, FeatureStatus};
use crate::provider::OperationStatus;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Lookup {
    Found,
    Missing,
    Forbidden(Vec<String>),
    Fails(u16),
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get(String, String),
    CreateOrg(String, CreateRepository),
    CreateUser(CreateRepository),
    Update(String, String, UpdateRepository),
    Delete(String, String),
    ListOrg(String),
    ListUser(String),
    ListAuthenticated,
}

struct FakeState {
    lookup: Lookup,
    write_fails: bool,
    repository: Repository,
    listing: Vec<Repository>,
    listing_lookup: Lookup,
    calls: Vec<Call>,
    tokens: Vec<String>,
}

#[derive(Clone)]
struct FakeGitHub {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGitHub {
    fn new(lookup: Lookup) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                lookup,
                write_fails: false,
                repository: response_repository(),
                listing: Vec::new(),
                listing_lookup: Lookup::Found,
                calls: Vec::new(),
                tokens: Vec::new(),
            })),
        }
    }

    fn failing_writes(self) -> Self {
        self.state.lock().unwrap().write_fails = true;
        self
    }

    fn with_listing(self, repos: Vec<Repository>) -> Self {
        self.state.lock().unwrap().listing = repos;
        self
    }

    fn failing_listing(self, lookup: Lookup) -> Self {
        self.state.lock().unwrap().listing_lookup = lookup;
        self
    }

    fn listing_result(&self) -> GitHubResult<Vec<Repository>> {
        let state = self.state.lock().unwrap();
        lookup_result(&state.listing_lookup, state.listing.clone())
    }

    fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn write_result(&self) -> GitHubResult<Repository> {
        let state = self.state.lock().unwrap();
        if state.write_fails {
            Err(GitHubError::Request {
                status: 422,
                message: "Validation Failed".into(),
                errors: vec!["name already exists on this account".into()],
            })
        } else {
            Ok(state.repository.clone())
        }
    }

    fn handler(&self) -> RepositoryHandler<impl ClientFactory + use<>> {
        let fake = self.clone();
        RepositoryHandler::new(move |token: &str| -> Result<Box<dyn RepoOps>> {
            fake.state.lock().unwrap().tokens.push(token.to_string());
            Ok(Box::new(fake.clone()))
        })
    }
}

#[async_trait]
impl RepoOps for FakeGitHub {
    async fn get_repo(&self, owner: &str, name: &str) -> GitHubResult<Repository> {
        self.record(Call::Get(owner.into(), name.into()));
        let state = self.state.lock().unwrap();
        lookup_result(&state.lookup, state.repository.clone())
    }

    async fn create_org_repo(
        &self,
        org: &str,
        repo: &CreateRepository,
    ) -> GitHubResult<Repository> {
        self.record(Call::CreateOrg(org.into(), repo.clone()));
        self.write_result()
    }

    async fn create_user_repo(&self, repo: &CreateRepository) -> GitHubResult<Repository> {
        self.record(Call::CreateUser(repo.clone()));
        self.write_result()
    }

    async fn update_repo(
        &self,
        owner: &str,
        name: &str,
        update: &UpdateRepository,
    ) -> GitHubResult<Repository> {
        self.record(Call::Update(owner.into(), name.into(), update.clone()));
        self.write_result()
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> GitHubResult<()> {
        self.record(Call::Delete(owner.into(), name.into()));
        self.write_result().map(|_| ())
    }

    async fn list_org_repos(&self, org: &str) -> GitHubResult<Vec<Repository>> {
        self.record(Call::ListOrg(org.into()));
        self.listing_result()
    }

    async fn list_user_repos(&self, user: &str) -> GitHubResult<Vec<Repository>> {
        self.record(Call::ListUser(user.into()));
        self.listing_result()
    }

    async fn list_authenticated_repos(&self) -> GitHubResult<Vec<Repository>> {
        self.record(Call::ListAuthenticated);
        self.listing_result()
    }
}

fn lookup_result<T>(lookup: &Lookup, found: T) -> GitHubResult<T> {
    match lookup {
        Lookup::Found => Ok(found),
        Lookup::Missing => Err(GitHubError::NotFound {
            message: "Not Found".into(),
        }),
        Lookup::Forbidden(errors) => Err(GitHubError::Forbidden {
            message: "Resource not accessible by personal access token".into(),
            errors: errors.clone(),
        }),
        Lookup::Fails(status) => Err(GitHubError::Request {
            status: *status,
            message: "Server Error".into(),
            errors: Vec::new(),
        }),
    }
}

fn response_repository() -> Repository {
    Repository {
        id: 1296269,
        name: "demo".into(),
        full_name: "alice/demo".into(),
        owner: RepositoryOwner {
            login: "alice".into(),
        },
        private: true,
        git_url: Some("git://github.com/alice/demo.git".into()),
        html_url: Some("https://github.com/alice/demo".into()),
        default_branch: Some("main".into()),
        language: Some("Rust".into()),
        forks_count: 3,
        stargazers_count: 4,
        watchers_count: 5,
        open_issues_count: 6,
        ..Default::default()
    }
}

fn request(model: ResourceModel) -> ResourceRequest {
    ResourceRequest::new("MyRepository", model)
}

fn user_model() -> ResourceModel {
    ResourceModel {
        owner: Some("alice".into()),
        name: Some("demo".into()),
        access_token: Some(AccessToken::new("ghp_test")),
        ..Default::default()
    }
}

fn org_model() -> ResourceModel {
    ResourceModel {
        org: Some("acme".into()),
        name: Some("demo".into()),
        access_token: Some(AccessToken::new("ghp_test")),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_fails_when_repository_exists() {
    let github = FakeGitHub::new(Lookup::Found);

    let err = github.handler().create(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::AlreadyExists);
    assert!(err.to_string().contains("'MyRepository'"));
    assert_eq!(github.calls(), vec![Call::Get("alice".into(), "demo".into())]);
}

#[tokio::test]
async fn test_create_user_repository() {
    let github = FakeGitHub::new(Lookup::Missing);
    let model = ResourceModel {
        name: Some("demo".into()),
        private: Some(true),
        access_token: Some(AccessToken::new("ghp_test")),
        ..Default::default()
    };

    let event = github.handler().create(request(model)).await.unwrap();

    let expected_body = CreateRepository {
        name: "demo".into(),
        private: Some(true),
        ..Default::default()
    };
    assert_eq!(github.calls(), vec![Call::CreateUser(expected_body)]);

    let model = event.resource_model.unwrap();
    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(model.owner.as_deref(), Some("alice"));
    assert_eq!(model.git_url.as_deref(), Some("git://github.com/alice/demo.git"));
    assert_eq!(model.forks_count, Some(3));
    assert_eq!(model.stars_count, Some(4));
    assert_eq!(model.watchers_count, Some(5));
    assert_eq!(model.issues_count, Some(6));
}

#[tokio::test]
async fn test_create_org_repository() {
    let github = FakeGitHub::new(Lookup::Missing);
    let mut model = org_model();
    model.team_id = Some(7);

    github.handler().create(request(model)).await.unwrap();

    let calls = github.calls();
    assert_eq!(calls[0], Call::Get("acme".into(), "demo".into()));
    match &calls[1] {
        Call::CreateOrg(org, body) => {
            assert_eq!(org, "acme");
            assert_eq!(body.team_id, Some(7));
        }
        other => panic!("expected org creation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_proceeds_after_inconclusive_probe_when_lenient() {
    let github = FakeGitHub::new(Lookup::Fails(502));

    let event = github.handler().create(request(user_model())).await.unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    assert!(matches!(github.calls().last(), Some(Call::CreateUser(_))));
}

#[tokio::test]
async fn test_create_fails_after_inconclusive_probe_when_strict() {
    let github = FakeGitHub::new(Lookup::Fails(502));
    let handler = github.handler().probe_policy(ProbePolicy::Strict);

    let err = handler.create(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InternalFailure);
    assert_eq!(github.calls().len(), 1);
}

#[tokio::test]
async fn test_create_failure_is_internal() {
    let github = FakeGitHub::new(Lookup::Missing).failing_writes();

    let err = github.handler().create(request(org_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InternalFailure);
    assert!(err.to_string().contains("Validation Failed"));
}

#[tokio::test]
async fn test_create_uses_model_token() {
    let github = FakeGitHub::new(Lookup::Missing);

    github.handler().create(request(user_model())).await.unwrap();

    assert_eq!(github.tokens(), vec!["ghp_test"]);
}

#[tokio::test]
async fn test_update_fails_when_repository_missing() {
    let github = FakeGitHub::new(Lookup::Missing);

    let err = github.handler().update(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::NotFound);
    assert_eq!(github.calls(), vec![Call::Get("alice".into(), "demo".into())]);
}

#[tokio::test]
async fn test_update_fails_after_inconclusive_probe_when_lenient() {
    let github = FakeGitHub::new(Lookup::Fails(500));

    let err = github.handler().update(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::NotFound);
    assert_eq!(github.calls().len(), 1);
}

#[tokio::test]
async fn test_update_fails_after_inconclusive_probe_when_strict() {
    let github = FakeGitHub::new(Lookup::Fails(502));
    let handler = github.handler().probe_policy(ProbePolicy::Strict);

    let err = handler.update(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InternalFailure);
    assert!(err.to_string().contains("502"));
    assert_eq!(github.calls(), vec![Call::Get("alice".into(), "demo".into())]);
}

#[tokio::test]
async fn test_update_sends_empty_security_and_analysis() {
    let github = FakeGitHub::new(Lookup::Found);

    let event = github.handler().update(request(user_model())).await.unwrap();

    match &github.calls()[1] {
        Call::Update(owner, name, body) => {
            assert_eq!((owner.as_str(), name.as_str()), ("alice", "demo"));
            assert_eq!(body.name.as_deref(), Some("demo"));
            assert_eq!(
                serde_json::to_value(body).unwrap()["security_and_analysis"],
                serde_json::json!({})
            );
        }
        other => panic!("expected update, got {:?}", other),
    }
    assert_eq!(event.resource_model.unwrap().html_url.as_deref(), Some("https://github.com/alice/demo"));
}

#[tokio::test]
async fn test_update_sends_security_and_analysis() {
    let github = FakeGitHub::new(Lookup::Found);
    let mut model = user_model();
    model.security_and_analysis = Some(SecurityAndAnalysis {
        advanced_security: None,
        secret_scanning: Some(FeatureStatus::Enabled),
    });

    github.handler().update(request(model)).await.unwrap();

    let Call::Update(_, _, body) = &github.calls()[1] else {
        panic!("expected update call");
    };
    assert_eq!(
        serde_json::to_value(body).unwrap()["security_and_analysis"],
        serde_json::json!({"secret_scanning": {"status": "enabled"}})
    );
}

#[tokio::test]
async fn test_update_requires_owner() {
    let github = FakeGitHub::new(Lookup::Found);
    let mut model = user_model();
    model.owner = None;

    let err = github.handler().update(request(model)).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InvalidRequest);
    assert!(github.calls().is_empty());
}

#[tokio::test]
async fn test_delete_fails_when_repository_missing() {
    let github = FakeGitHub::new(Lookup::Missing);

    let err = github.handler().delete(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::NotFound);
    assert_eq!(github.calls().len(), 1);
}

#[tokio::test]
async fn test_delete_reports_probed_state() {
    let github = FakeGitHub::new(Lookup::Found);

    let event = github.handler().delete(request(org_model())).await.unwrap();

    assert_eq!(
        github.calls(),
        vec![
            Call::Get("acme".into(), "demo".into()),
            Call::Delete("acme".into(), "demo".into()),
        ]
    );
    let model = event.resource_model.unwrap();
    assert_eq!(model.owner.as_deref(), Some("alice"));
    assert_eq!(model.language.as_deref(), Some("Rust"));
}

#[tokio::test]
async fn test_delete_proceeds_after_inconclusive_probe() {
    let github = FakeGitHub::new(Lookup::Fails(503));
    let handler = github.handler().probe_policy(ProbePolicy::Strict);

    let event = handler.delete(request(user_model())).await.unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(
        github.calls().last(),
        Some(&Call::Delete("alice".into(), "demo".into()))
    );
    assert!(event.resource_model.unwrap().git_url.is_none());
}

#[tokio::test]
async fn test_delete_failure_is_internal() {
    let github = FakeGitHub::new(Lookup::Found).failing_writes();

    let err = github.handler().delete(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InternalFailure);
}

#[tokio::test]
async fn test_read_maps_observed_fields() {
    let github = FakeGitHub::new(Lookup::Found);

    let event = github.handler().read(request(user_model())).await.unwrap();

    let model = event.resource_model.unwrap();
    assert_eq!(model.owner.as_deref(), Some("alice"));
    assert_eq!(model.html_url.as_deref(), Some("https://github.com/alice/demo"));
    assert_eq!(model.default_branch.as_deref(), Some("main"));
    assert_eq!(model.language.as_deref(), Some("Rust"));
    assert_eq!(model.forks_count, Some(3));
    assert_eq!(model.stars_count, Some(4));
    assert_eq!(model.watchers_count, Some(5));
    assert_eq!(model.issues_count, Some(6));
}

#[tokio::test]
async fn test_read_not_found() {
    let github = FakeGitHub::new(Lookup::Missing);

    let err = github.handler().read(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::NotFound);
    assert_eq!(
        err.to_string(),
        "Resource of type 'GitHub::Repositories::Repository' with identifier 'MyRepository' was not found."
    );
}

#[tokio::test]
async fn test_read_access_denied_joins_messages() {
    let github = FakeGitHub::new(Lookup::Forbidden(vec![
        "first problem".into(),
        "second problem".into(),
    ]));

    let err = github.handler().read(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::AccessDenied);
    assert_eq!(err.to_string(), "first problem\nsecond problem");
}

#[tokio::test]
async fn test_read_access_denied_without_sub_errors() {
    let github = FakeGitHub::new(Lookup::Forbidden(Vec::new()));

    let err = github.handler().read(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::AccessDenied);
    assert_eq!(
        err.to_string(),
        "Resource not accessible by personal access token"
    );
}

#[tokio::test]
async fn test_read_other_failure_is_internal() {
    let github = FakeGitHub::new(Lookup::Fails(500));

    let err = github.handler().read(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InternalFailure);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_list_echoes_model_without_calls() {
    let github = FakeGitHub::new(Lookup::Fails(500));
    let model = user_model();

    let event = github.handler().list(request(model.clone())).await.unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(event.resource_models, Some(vec![model]));
    assert!(event.resource_model.is_none());
    assert!(github.calls().is_empty());
    assert!(github.tokens().is_empty());
}

#[tokio::test]
async fn test_list_enumerates_org_repositories() {
    let mut second = response_repository();
    second.name = "tools".into();
    let github = FakeGitHub::new(Lookup::Found)
        .with_listing(vec![response_repository(), second]);
    let handler = github.handler().list_mode(ListMode::Enumerate);

    let event = handler.list(request(org_model())).await.unwrap();

    assert_eq!(github.calls(), vec![Call::ListOrg("acme".into())]);
    let models = event.resource_models.unwrap();
    let names: Vec<_> = models.iter().filter_map(|m| m.name.as_deref()).collect();
    assert_eq!(names, vec!["demo", "tools"]);
    assert!(models.iter().all(|m| m.access_token.is_none()));
}

#[tokio::test]
async fn test_list_enumerates_by_owner_or_token() {
    let github = FakeGitHub::new(Lookup::Found);
    let handler = github.handler().list_mode(ListMode::Enumerate);

    handler.list(request(user_model())).await.unwrap();
    handler
        .list(request(ResourceModel {
            access_token: Some(AccessToken::new("ghp_test")),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(
        github.calls(),
        vec![Call::ListUser("alice".into()), Call::ListAuthenticated]
    );
}

#[tokio::test]
async fn test_list_enumeration_not_found() {
    let github = FakeGitHub::new(Lookup::Found).failing_listing(Lookup::Missing);
    let handler = github.handler().list_mode(ListMode::Enumerate);

    let err = handler.list(request(org_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::NotFound);
    assert_eq!(github.calls(), vec![Call::ListOrg("acme".into())]);
}

#[tokio::test]
async fn test_list_enumeration_access_denied_joins_messages() {
    let github = FakeGitHub::new(Lookup::Found).failing_listing(Lookup::Forbidden(vec![
        "SAML enforcement".into(),
        "token expired".into(),
    ]));
    let handler = github.handler().list_mode(ListMode::Enumerate);

    let err = handler.list(request(user_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::AccessDenied);
    assert_eq!(err.to_string(), "SAML enforcement\ntoken expired");
}

#[tokio::test]
async fn test_list_enumeration_other_failure_is_internal() {
    let github = FakeGitHub::new(Lookup::Found).failing_listing(Lookup::Fails(500));
    let handler = github.handler().list_mode(ListMode::Enumerate);

    let err = handler.list(request(org_model())).await.unwrap_err();

    assert_eq!(err.error_code(), HandlerErrorCode::InternalFailure);
}
