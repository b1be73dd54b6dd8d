use crate::error::InteractionError;

/// Leftward drag at or past this displacement marks the dish as a favorite.
pub const FAVORITE_DX_THRESHOLD: f64 = -200.0;
/// Rightward drag at or past this displacement opens the comment form.
pub const COMMENT_DX_THRESHOLD: f64 = 200.0;

/// Pointer motion relative to the point where the touch started.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    pub move_x: f64,
    pub move_y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl GestureSample {
    pub fn horizontal(dx: f64) -> Self {
        Self {
            dx,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Favorite,
    Comment,
    None,
}

impl Classification {
    pub fn from_dx(dx: f64) -> Self {
        if dx <= FAVORITE_DX_THRESHOLD {
            Classification::Favorite
        } else if dx >= COMMENT_DX_THRESHOLD {
            Classification::Comment
        } else {
            Classification::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Comment => "comment",
            Self::None => "none",
        }
    }
}

/// One touch session, from grant to release.
#[derive(Debug, Default)]
pub struct GestureSession {
    last: Option<GestureSample>,
    sample_count: usize,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each sample supersedes the previous one.
    pub fn record(&mut self, sample: GestureSample) {
        self.last = Some(sample);
        self.sample_count += 1;
    }

    pub fn last_sample(&self) -> Option<GestureSample> {
        self.last
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn classify(&self) -> Classification {
        self.last
            .map(|sample| Classification::from_dx(sample.dx))
            .unwrap_or(Classification::None)
    }
}

/// Owns at most one active session and refuses overlapping ones.
#[derive(Debug, Default)]
pub struct GestureClassifier {
    active: Option<GestureSession>,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn begin(&mut self) -> Result<(), InteractionError> {
        if self.active.is_some() {
            return Err(InteractionError::SessionAlreadyActive);
        }
        self.active = Some(GestureSession::new());
        Ok(())
    }

    pub fn record(&mut self, sample: GestureSample) -> Result<(), InteractionError> {
        let session = self
            .active
            .as_mut()
            .ok_or(InteractionError::NoActiveSession)?;
        session.record(sample);
        tracing::trace!(dx = sample.dx, dy = sample.dy, "gesture sample");
        Ok(())
    }

    pub fn end(&mut self) -> Result<Classification, InteractionError> {
        let session = self.active.take().ok_or(InteractionError::NoActiveSession)?;
        let classification = session.classify();
        tracing::debug!(
            samples = session.sample_count(),
            dx = session.last_sample().map(|s| s.dx),
            classification = classification.as_str(),
            "gesture session ended"
        );
        Ok(classification)
    }
}
