pub mod domain;
pub mod mood;
pub mod neurobic;
pub mod ports;
pub mod questionnaires;

pub use domain::{
    Appointment, AuthSession, ChatMessage, ChatRole, ChatbotKind, ExerciseSession, NewAppointment,
    NewExerciseSession, NewQuestionnaireResponse, QuestionnaireResponse, SessionKind, User,
    UserCredentials,
};
pub use ports::{ChatService, DatabaseService, PortError, PortResult, TokenStream};
