use std::sync::Mutex;

use async_trait::async_trait;

use kernsweep_core::*;
use kernsweep_pkg::{HostError, InstalledPackage, KernelHost};

// Mock implementations
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Purge(Vec<String>),
    UpdateBootloader,
}

struct MockHost {
    release: &'static str,
    packages: Vec<InstalledPackage>,
    fail_listing: bool,
    fail_purge: bool,
    deny_purge: bool,
    fail_bootloader: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockHost {
    fn new(release: &'static str, names: &[&str]) -> Self {
        Self {
            release,
            packages: names
                .iter()
                .map(|name| InstalledPackage::new(*name, "1"))
                .collect(),
            fail_listing: false,
            fail_purge: false,
            deny_purge: false,
            fail_bootloader: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KernelHost for MockHost {
    async fn running_kernel(&self) -> Result<String, HostError> {
        Ok(self.release.to_string())
    }

    async fn installed_packages(&self) -> Result<Vec<InstalledPackage>, HostError> {
        if self.fail_listing {
            return Err(HostError::QueryFailed {
                command: "dpkg -l".to_string(),
                status: 2,
                stderr: "database locked".to_string(),
            });
        }
        Ok(self.packages.clone())
    }

    async fn purge_packages(&self, packages: &[String]) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(Call::Purge(packages.to_vec()));
        if self.fail_purge {
            return Err(HostError::LockConflict("Could not get lock".to_string()));
        }
        if self.deny_purge {
            return Err(HostError::PermissionDenied(
                "E: Could not open lock file - open (13: Permission denied)\n".to_string(),
            ));
        }
        Ok(())
    }

    async fn update_bootloader(&self) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(Call::UpdateBootloader);
        if self.fail_bootloader {
            return Err(HostError::CommandFailed {
                command: "update-grub".to_string(),
                status: 1,
                message: "grub-mkconfig failed".to_string(),
            });
        }
        Ok(())
    }

    fn host_type(&self) -> &'static str {
        "mock"
    }
}

struct ScriptedConfirmer {
    answer: &'static str,
    asked: Mutex<u32>,
}

impl ScriptedConfirmer {
    fn answering(answer: &'static str) -> Self {
        Self {
            answer,
            asked: Mutex::new(0),
        }
    }

    fn times_asked(&self) -> u32 {
        *self.asked.lock().unwrap()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, _plan: &RemovalPlan) -> bool {
        *self.asked.lock().unwrap() += 1;
        is_affirmative(self.answer)
    }
}

const THREE_KERNELS: &[&str] = &[
    "linux-image-5.4.0-1-amd64",
    "linux-headers-5.4.0-1-amd64",
    "linux-headers-5.4.0-1-common",
    "linux-image-5.8.0-2-amd64",
    "linux-headers-5.8.0-2-amd64",
    "linux-image-5.10.0-3-amd64",
    "linux-image-amd64",
    "linux-libc-dev",
];

fn oldest_group() -> Vec<String> {
    vec![
        "linux-headers-5.4.0-1-amd64".to_string(),
        "linux-headers-5.4.0-1-common".to_string(),
        "linux-image-5.4.0-1-amd64".to_string(),
    ]
}

async fn context(host: &MockHost, dry_run: bool) -> Context {
    Context::discover(host).await.unwrap().with_dry_run(dry_run)
}

#[tokio::test]
async fn test_confirmed_removal_purges_then_updates_bootloader() {
    let host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let outcome = workflow.run().await.unwrap();

    let plan = match outcome {
        WorkflowOutcome::Removed(plan) => plan,
        other => panic!("expected removal, got {other:?}"),
    };
    assert_eq!(plan.group.version, KernelVersion::new(5, 4, 0, 1));
    assert_eq!(plan.running, "5.10.0-3-amd64");
    assert_eq!(workflow.state(), WorkflowState::Done);
    assert_eq!(confirmer.times_asked(), 1);
    assert_eq!(
        host.calls(),
        vec![Call::Purge(oldest_group()), Call::UpdateBootloader]
    );
}

#[tokio::test]
async fn test_dry_run_never_mutates() {
    let host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = context(&host, true).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let outcome = workflow.run().await.unwrap();

    assert!(matches!(
        outcome,
        WorkflowOutcome::DryRun(ref plan) if plan.group.packages == oldest_group()
    ));
    assert_eq!(workflow.state(), WorkflowState::DryRun);
    assert_eq!(confirmer.times_asked(), 0);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_declined_confirmation_never_mutates() {
    for answer in ["no", "n", "", "maybe", "yess"] {
        let host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
        let confirmer = ScriptedConfirmer::answering(answer);
        let ctx = context(&host, false).await;

        let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
        let outcome = workflow.run().await.unwrap();

        assert!(matches!(outcome, WorkflowOutcome::Aborted(_)), "{answer:?}");
        assert_eq!(workflow.state(), WorkflowState::Aborted);
        assert!(host.calls().is_empty(), "{answer:?}");
    }
}

#[tokio::test]
async fn test_one_spare_means_nothing_to_remove() {
    let host = MockHost::new(
        "5.10.0-3-amd64",
        &["linux-image-5.8.0-2-amd64", "linux-image-5.10.0-3-amd64"],
    );
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let outcome = workflow.run().await.unwrap();

    assert_eq!(outcome, WorkflowOutcome::NothingToRemove);
    assert_eq!(confirmer.times_asked(), 0);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_running_kernel_is_kept_even_when_oldest() {
    let host = MockHost::new("5.4.0-1-amd64", THREE_KERNELS);
    let confirmer = ScriptedConfirmer::answering("y");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let outcome = workflow.run().await.unwrap();

    let plan = match outcome {
        WorkflowOutcome::Removed(plan) => plan,
        other => panic!("expected removal, got {other:?}"),
    };
    assert_eq!(plan.group.version, KernelVersion::new(5, 8, 0, 2));
    assert!(
        plan.group
            .packages
            .iter()
            .all(|p| !p.contains("5.4.0-1"))
    );
}

#[tokio::test]
async fn test_purge_failure_reports_nothing_removed() {
    let mut host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    host.fail_purge = true;
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let err = workflow.run().await.unwrap_err();

    assert!(matches!(
        err,
        KernelError::Removal {
            stage: RemovalStage::Purge,
            ..
        }
    ));
    assert!(err.removed_packages().is_empty());
    assert_eq!(workflow.state(), WorkflowState::Failed);
    // no bootloader update after a failed purge
    assert_eq!(host.calls(), vec![Call::Purge(oldest_group())]);
}

#[tokio::test]
async fn test_bootloader_failure_reports_removed_packages() {
    let mut host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    host.fail_bootloader = true;
    let confirmer = ScriptedConfirmer::answering("oui");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let err = workflow.run().await.unwrap_err();

    assert!(matches!(
        err,
        KernelError::Removal {
            stage: RemovalStage::Bootloader,
            ..
        }
    ));
    assert_eq!(err.removed_packages(), oldest_group().as_slice());
    assert_eq!(workflow.state(), WorkflowState::Failed);
}

#[tokio::test]
async fn test_listing_failure_is_discovery_error() {
    let mut host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    host.fail_listing = true;
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let err = workflow.run().await.unwrap_err();

    assert!(matches!(err, KernelError::Discovery { .. }));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_unparseable_running_kernel_is_rejected() {
    let host = MockHost::new("custom", THREE_KERNELS);
    let err = Context::discover(&host).await.unwrap_err();
    assert!(matches!(err, KernelError::VersionParse(_)));
}

#[tokio::test]
async fn test_status_is_read_only() {
    let host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    let ctx = context(&host, false).await;

    let report = status(&ctx, &host).await.unwrap();

    assert_eq!(report.kernels.len(), 3);
    assert!(report.kernels[0].running);
    assert_eq!(report.removable, Some(KernelVersion::new(5, 4, 0, 1)));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_purge_permission_denied_is_privilege_error() {
    let mut host = MockHost::new("5.10.0-3-amd64", THREE_KERNELS);
    host.deny_purge = true;
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = context(&host, false).await;

    let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
    let err = workflow.run().await.unwrap_err();

    assert!(
        matches!(err, KernelError::Privilege(ref msg) if msg.ends_with("Permission denied)")),
        "{err:?}"
    );
    assert_eq!(workflow.state(), WorkflowState::Failed);
    assert_eq!(host.calls(), vec![Call::Purge(oldest_group())]);
}

#[tokio::test]
async fn test_status_with_unversioned_running_kernel() {
    let host = MockHost::new("6.5.0", THREE_KERNELS);
    let ctx = Context::discover_for_status(&host).await.unwrap();

    let report = status(&ctx, &host).await.unwrap();

    assert_eq!(report.running, "6.5.0");
    assert_eq!(report.kernels.len(), 3);
    assert!(report.kernels.iter().all(|k| !k.running));
    assert_eq!(report.removable, Some(KernelVersion::new(5, 4, 0, 1)));
}

#[tokio::test]
async fn test_removal_refuses_unversioned_running_kernel() {
    let host = MockHost::new("6.5.0", THREE_KERNELS);
    let confirmer = ScriptedConfirmer::answering("yes");
    let ctx = Context::discover_for_status(&host).await.unwrap();

    for dry_run in [false, true] {
        let ctx = ctx.clone().with_dry_run(dry_run);
        let mut workflow = RemovalWorkflow::new(&ctx, &host, &confirmer);
        let err = workflow.run().await.unwrap_err();

        assert!(matches!(err, KernelError::VersionParse(ref r) if r == "6.5.0"));
    }
    assert_eq!(confirmer.times_asked(), 0);
    assert!(host.calls().is_empty());
}
