mod jwt_payload;

pub use jwt_payload::JwtPayload;
