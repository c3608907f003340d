use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// A transient message for the user, shown by the front end as a toast.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Notices {
    notices: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Notices {
        Notices::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        });
    }

    pub fn failure(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Failure,
            message: message.into(),
        });
    }

    pub fn into_vec(self) -> Vec<Notice> {
        self.notices
    }
}

#[cfg(test)]
impl Notices {
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }
}
