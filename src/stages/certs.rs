use super::{restart_stage, Stage, StageBuilder, StageFile};
use crate::args::KubeComponent;
use crate::cert::{CaSource, ReconcileOutcome, SanReconciler};
use crate::error::Result;

const CERT_FILE_PERMISSIONS: u32 = 0o600;

impl StageBuilder<'_> {
    /// Stages that replace the apiserver certificate when it lacks any of
    /// `extra_sans`. Empty when the certificate already covers them or does
    /// not exist yet.
    pub(crate) fn apiserver_cert_stages(&mut self, extra_sans: &[String]) -> Result<Vec<Stage>> {
        let ca_source = CaSource::Files {
            cert_path: self.paths.ca_cert(),
            key_path: self.paths.ca_key(),
        };
        let cert_path = self.paths.apiserver_cert();

        let outcome = SanReconciler::new(self.storage, &mut *self.logger).reconcile(
            &cert_path,
            extra_sans,
            &ca_source,
        )?;

        let pair = match outcome {
            ReconcileOutcome::Unchanged => return Ok(Vec::new()),
            ReconcileOutcome::Regenerated(pair) => pair,
        };

        Ok(vec![
            Stage {
                name: "Regenerate Apiserver Certificates".to_string(),
                files: vec![
                    StageFile::new(&cert_path, CERT_FILE_PERMISSIONS, pair.cert_pem),
                    StageFile::new(&self.paths.apiserver_key(), CERT_FILE_PERMISSIONS, pair.key_pem),
                ],
                ..Stage::default()
            },
            restart_stage(
                "Restart Kube Components Services",
                [
                    KubeComponent::ApiServer.service_name(),
                    KubeComponent::Kubelet.service_name(),
                ],
            ),
        ])
    }
}
