use crate::fixtures::CLIP_VIDEO_PLACEHOLDER;
use crate::models::{ClipDraft, SkillClip};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use uuid::Uuid;

pub const UPLOAD_TICK: Duration = Duration::from_millis(120);
pub const UPLOAD_STEP: u8 = 12;
pub const SELF_CREATOR_ID: &str = "self";

pub struct UploadTask {
    progress: watch::Receiver<u8>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<Option<SkillClip>>>,
}

impl UploadTask {
    pub fn start(draft: ClipDraft) -> Self {
        let (tx, rx) = watch::channel(0u8);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(UPLOAD_TICK);
            ticker.tick().await;
            let mut progress = 0u8;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(title = %draft.title, progress, "upload cancelled");
                        return None;
                    }
                    _ = ticker.tick() => {}
                }
                progress = progress.saturating_add(UPLOAD_STEP).min(100);
                let _ = tx.send(progress);
                if progress == 100 {
                    break;
                }
            }

            Some(finalize_clip(draft))
        });

        Self {
            progress: rx,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn finish(mut self) -> Option<SkillClip> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(clip) => clip,
            Err(e) => {
                error!(error = %e, "upload task failed");
                None
            }
        }
    }
}

impl Drop for UploadTask {
    fn drop(&mut self) {
        // no-op once the task has finished
        self.cancel.cancel();
    }
}

pub fn finalize_clip(draft: ClipDraft) -> SkillClip {
    let preview_url = if draft.preview_url.trim().is_empty() {
        format!("https://source.unsplash.com/random/800x600?{}", draft.tag)
    } else {
        draft.preview_url
    };

    SkillClip {
        id: format!("uploaded-{}", Uuid::new_v4()),
        title: draft.title,
        creator_id: SELF_CREATOR_ID.to_string(),
        preview_url,
        video_url: Some(
            draft
                .video_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| CLIP_VIDEO_PLACEHOLDER.to_string()),
        ),
        duration: draft.duration,
        likes: 0,
        comments: 0,
        saves: 0,
        views: Some(0),
        tags: vec![draft.tag],
        cta_session_id: None,
    }
}
