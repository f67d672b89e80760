//! Per-service post-install and cleanup actions.
//!
//! # Action table
//!
//! | Kind    | After upload                                   | On nuke                                 |
//! |---------|------------------------------------------------|-----------------------------------------|
//! | Nginx   | swap `sites-enabled` symlink, restart nginx    | remove symlink, reload nginx            |
//! | Uwsgi   | reload init config, restart `{project}.uwsgi`  | stop `{project}.uwsgi`, reload init config |
//! | App     | create socket dir + socket, chmod, chown       | remove socket                           |
//! | Generic | nothing                                        | nothing                                 |
//!
//! Nuke always removes the installed file first, whatever the kind.
//! All commands run privileged.

use stagehand_core::{Deployment, RemotePath, ServiceDescriptor, ServiceKind};
use stagehand_remote::{RemoteCommand, RemoteExecutor};

use crate::error::{CleanupError, PostActionError};

/// `{sites_enabled}/{project}.nginx.{ext}`
fn nginx_link(deployment: &Deployment, service: &ServiceDescriptor) -> RemotePath {
    deployment
        .project
        .nginx
        .sites_enabled
        .join(&service.artifact_file_name(deployment.project_filename()))
}

fn reload_init_configuration() -> RemoteCommand {
    RemoteCommand::new("initctl").arg("reload-configuration")
}

/// Commands run, in order, after `service`'s artifact is uploaded.
pub fn post_install_commands(
    deployment: &Deployment,
    service: &ServiceDescriptor,
) -> Vec<RemoteCommand> {
    let project = deployment.project_filename();
    match service.kind() {
        ServiceKind::Nginx => {
            let link = nginx_link(deployment, service);
            let staged_link = RemotePath(format!("{link}.stagehand-new"));
            vec![
                RemoteCommand::new("ln")
                    .arg("-sfn")
                    .path(&deployment.installed_path(service))
                    .path(&staged_link),
                // rename(2) over the live link: nginx never sees it missing.
                RemoteCommand::new("mv")
                    .arg("-Tf")
                    .path(&staged_link)
                    .path(&link),
                RemoteCommand::service("nginx", "restart"),
            ]
        }
        ServiceKind::Uwsgi => vec![
            reload_init_configuration(),
            RemoteCommand::service(&service.installed_service_name(project), "restart"),
        ],
        ServiceKind::App => {
            let socket = &deployment.project.socket;
            let mut commands = Vec::new();
            if let Some(dir) = socket.path.parent() {
                commands.push(RemoteCommand::new("mkdir").arg("-p").path(&dir));
            }
            commands.push(RemoteCommand::new("touch").path(&socket.path));
            commands.push(RemoteCommand::new("chmod").arg(&socket.mode).path(&socket.path));
            commands.push(RemoteCommand::new("chown").arg(&socket.owner).path(&socket.path));
            commands
        }
        ServiceKind::Generic => Vec::new(),
    }
}

/// Commands run, in order, to remove `service` from the target.
pub fn cleanup_commands(deployment: &Deployment, service: &ServiceDescriptor) -> Vec<RemoteCommand> {
    let project = deployment.project_filename();
    let mut commands = vec![RemoteCommand::remove_file(&deployment.installed_path(service))];
    match service.kind() {
        ServiceKind::Nginx => {
            commands.push(RemoteCommand::remove_file(&nginx_link(deployment, service)));
            commands.push(RemoteCommand::service("nginx", "reload"));
        }
        ServiceKind::Uwsgi => {
            commands.push(RemoteCommand::service(
                &service.installed_service_name(project),
                "stop",
            ));
            commands.push(reload_init_configuration());
        }
        ServiceKind::App => {
            commands.push(RemoteCommand::remove_file(&deployment.project.socket.path));
        }
        ServiceKind::Generic => {}
    }
    commands
}

/// Run the post-install commands for `service`, stopping at the first
/// failure since each step builds on the previous one.
pub fn run_post_install(
    deployment: &Deployment,
    service: &ServiceDescriptor,
    executor: &dyn RemoteExecutor,
) -> Result<(), PostActionError> {
    for command in post_install_commands(deployment, service) {
        let result = executor
            .run_privileged(&command)
            .and_then(|output| output.ensure_success(&command));
        if let Err(err) = result {
            return Err(PostActionError {
                service: service.name.clone(),
                command: command.to_shell(),
                reason: err.to_string(),
            });
        }
        tracing::info!(service = %service.name, command = %command, "post-install step done");
    }
    Ok(())
}

/// Run every cleanup command for `service`, continuing past failures.
pub fn run_cleanup(
    deployment: &Deployment,
    service: &ServiceDescriptor,
    executor: &dyn RemoteExecutor,
) -> Vec<CleanupError> {
    let mut errors = Vec::new();
    for command in cleanup_commands(deployment, service) {
        let result = executor
            .run_privileged(&command)
            .and_then(|output| output.ensure_success(&command));
        match result {
            Ok(_) => tracing::info!(service = %service.name, command = %command, "cleanup step done"),
            Err(err) => {
                tracing::warn!(service = %service.name, command = %command, error = %err, "cleanup step failed");
                errors.push(CleanupError {
                    service: service.name.clone(),
                    command: command.to_shell(),
                    reason: err.to_string(),
                });
            }
        }
    }
    errors
}
