// src/anuncios/anuncio_structs.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::erros::{AppError, ErroCampo};

/// Máximo de imagens numa submissão pública.
pub const MAX_IMAGENS_SUBMISSAO: usize = 3;
/// Máximo de imagens na edição pelo administrador.
pub const MAX_IMAGENS_EDICAO: usize = 5;

const SEM_CATEGORIA: &str = "Sem Categoria";

/// Status de moderação de um anúncio (enum `status_anuncio` no Postgres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "status_anuncio")]
pub enum StatusAnuncio {
    Pendente,
    Aprovado,
    Rejeitado,
}

impl StatusAnuncio {
    /// Estado de origem exigido pelas ações de moderação para chegar a `destino`.
    /// `None` quando nenhuma ação leva a `destino`.
    pub fn origem_para(destino: StatusAnuncio) -> Option<StatusAnuncio> {
        match destino {
            StatusAnuncio::Aprovado | StatusAnuncio::Rejeitado => Some(StatusAnuncio::Pendente),
            StatusAnuncio::Pendente => None,
        }
    }
}

impl fmt::Display for StatusAnuncio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let texto = match self {
            StatusAnuncio::Pendente => "Pendente",
            StatusAnuncio::Aprovado => "Aprovado",
            StatusAnuncio::Rejeitado => "Rejeitado",
        };
        f.write_str(texto)
    }
}

/// Anúncio resumido, usado nas listagens (cards).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnuncioResumo {
    pub id: Uuid,
    pub titulo: String,
    pub descricao: String,
    pub imagens: Option<Vec<String>>,
    pub categoria_id: Option<i32>,
    pub nome_categoria: Option<String>,
    pub localizacao_endereco: Option<String>,
    pub numero_whatsapp: Option<String>,
    pub nome_anunciante: Option<String>,
    pub status: StatusAnuncio,
    pub created_at: DateTime<Utc>,
}

/// Linha completa da tabela `anuncios`, com o nome da categoria.
#[derive(Debug, Clone, FromRow)]
pub struct Anuncio {
    pub id: Uuid,
    pub titulo: String,
    pub nome_anunciante: Option<String>,
    pub descricao: String,
    pub categoria_id: Option<i32>,
    pub nome_categoria: Option<String>,
    pub numero_whatsapp: Option<String>,
    pub links_redes_sociais: Option<serde_json::Value>,
    pub imagens: Option<Vec<String>>,
    pub localizacao_endereco: Option<String>,
    pub localizacao_latitude: Option<f64>,
    pub localizacao_longitude: Option<f64>,
    pub status: StatusAnuncio,
    pub aprovado_rejeitado_por: Option<Uuid>,
    pub data_aprovacao_rejeicao: Option<DateTime<Utc>>,
    pub data_submissao: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRedeSocial {
    pub rede: String,
    pub url: String,
}

/// Visão pública de detalhe de um anúncio.
#[derive(Debug, Serialize)]
pub struct AnuncioDetalhe {
    pub id: Uuid,
    pub titulo: String,
    pub nome_anunciante: String,
    pub descricao: String,
    pub categoria_id: Option<i32>,
    pub nome_categoria: String,
    pub numero_whatsapp: Option<String>,
    pub whatsapp_formatado: Option<String>,
    pub link_whatsapp: Option<String>,
    pub redes_sociais: Vec<LinkRedeSocial>,
    pub imagens: Vec<String>,
    pub localizacao_endereco: Option<String>,
    pub localizacao_latitude: Option<f64>,
    pub localizacao_longitude: Option<f64>,
    pub status: StatusAnuncio,
    pub created_at: DateTime<Utc>,
}

/// Campos de redes sociais como o formulário de edição os espera (sem domínio).
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CamposRedesSociais {
    pub instagram: String,
    pub tiktok: String,
    pub facebook: String,
    pub website: String,
}

/// Visão do administrador: detalhe + dados de moderação + formulário preenchido.
#[derive(Debug, Serialize)]
pub struct AnuncioAdmin {
    #[serde(flatten)]
    pub detalhe: AnuncioDetalhe,
    pub formulario_redes_sociais: CamposRedesSociais,
    pub aprovado_rejeitado_por: Option<Uuid>,
    pub data_aprovacao_rejeicao: Option<DateTime<Utc>>,
    pub data_submissao: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Anuncio> for AnuncioDetalhe {
    fn from(a: Anuncio) -> Self {
        let redes_sociais = links_para_exibicao(a.links_redes_sociais.as_ref());
        let numero = a
            .numero_whatsapp
            .as_deref()
            .map(somente_digitos)
            .filter(|n| !n.is_empty());

        AnuncioDetalhe {
            id: a.id,
            titulo: a.titulo,
            nome_anunciante: a.nome_anunciante.unwrap_or_default(),
            descricao: a.descricao,
            categoria_id: a.categoria_id,
            nome_categoria: a
                .nome_categoria
                .unwrap_or_else(|| SEM_CATEGORIA.to_string()),
            whatsapp_formatado: numero.as_deref().map(formatar_telefone),
            link_whatsapp: numero.as_ref().map(|n| format!("https://wa.me/{n}")),
            numero_whatsapp: a.numero_whatsapp,
            redes_sociais,
            imagens: a.imagens.unwrap_or_default(),
            localizacao_endereco: a.localizacao_endereco,
            localizacao_latitude: a.localizacao_latitude,
            localizacao_longitude: a.localizacao_longitude,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

impl From<Anuncio> for AnuncioAdmin {
    fn from(a: Anuncio) -> Self {
        let formulario_redes_sociais = campos_do_formulario(a.links_redes_sociais.as_ref());
        let aprovado_rejeitado_por = a.aprovado_rejeitado_por;
        let data_aprovacao_rejeicao = a.data_aprovacao_rejeicao;
        let data_submissao = a.data_submissao;
        let updated_at = a.updated_at;
        AnuncioAdmin {
            detalhe: a.into(),
            formulario_redes_sociais,
            aprovado_rejeitado_por,
            data_aprovacao_rejeicao,
            data_submissao,
            updated_at,
        }
    }
}

/// Aceita o ID da categoria como número ou texto numérico (formulários enviam texto).
fn id_flexivel<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Campo {
        Numero(i64),
        Texto(String),
    }

    Ok(match Option::<Campo>::deserialize(deserializer)? {
        Some(Campo::Numero(n)) => Some(n),
        Some(Campo::Texto(t)) => t.trim().parse().ok(),
        None => None,
    })
}

/// Formulário de anúncio, usado na submissão pública e na edição do administrador.
#[derive(Debug, Default, Deserialize)]
pub struct NovoAnuncio {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub nome_anunciante: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default, deserialize_with = "id_flexivel")]
    pub categoria_id: Option<i64>,
    #[serde(default)]
    pub numero_whatsapp: String,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub imagens: Vec<String>,
    #[serde(default)]
    pub localizacao_endereco: Option<String>,
}

/// Anúncio validado e normalizado, pronto para gravar.
#[derive(Debug, Clone, PartialEq)]
pub struct AnuncioValidado {
    pub titulo: String,
    pub nome_anunciante: String,
    pub descricao: String,
    pub categoria_id: i32,
    pub numero_whatsapp: String,
    pub links_redes_sociais: Option<serde_json::Value>,
    pub imagens: Option<Vec<String>>,
    pub localizacao_endereco: Option<String>,
}

fn validar_tamanho(
    erros: &mut Vec<ErroCampo>,
    campo: &'static str,
    rotulo: &str,
    valor: &str,
    min: usize,
    max: usize,
) {
    let tamanho = valor.chars().count();
    if tamanho < min {
        erros.push(ErroCampo::new(
            campo,
            format!("{rotulo} deve ter pelo menos {min} caracteres."),
        ));
    } else if tamanho > max {
        erros.push(ErroCampo::new(
            campo,
            format!("{rotulo} não pode ter mais de {max} caracteres."),
        ));
    }
}

impl NovoAnuncio {
    /// Valida o formulário inteiro e reporta todos os erros de uma vez.
    ///
    /// `imagem_valida` decide se uma URL de imagem pertence ao armazenamento do servidor.
    pub fn validar<F>(
        self,
        limite_imagens: usize,
        imagem_valida: F,
    ) -> Result<AnuncioValidado, AppError>
    where
        F: Fn(&str) -> bool,
    {
        let mut erros = Vec::new();

        let titulo = self.titulo.trim().to_string();
        let nome_anunciante = self.nome_anunciante.trim().to_string();
        let descricao = self.descricao.trim().to_string();
        validar_tamanho(&mut erros, "titulo", "Título", &titulo, 5, 100);
        validar_tamanho(&mut erros, "nome_anunciante", "Nome", &nome_anunciante, 3, 100);
        validar_tamanho(&mut erros, "descricao", "Descrição", &descricao, 10, 1000);

        let categoria_id = match self.categoria_id.map(i32::try_from) {
            Some(Ok(id)) if id > 0 => id,
            _ => {
                erros.push(ErroCampo::new("categoria_id", "Selecione uma categoria."));
                0
            }
        };

        let numero_whatsapp = somente_digitos(&self.numero_whatsapp);
        if !(10..=11).contains(&numero_whatsapp.len()) {
            erros.push(ErroCampo::new(
                "numero_whatsapp",
                "Número de WhatsApp inválido (use apenas números, DDD + número).",
            ));
        }

        let imagens: Vec<String> = self
            .imagens
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if imagens.len() > limite_imagens {
            erros.push(ErroCampo::new(
                "imagens",
                format!("Limite máximo de {limite_imagens} imagens atingido."),
            ));
        }
        if imagens.iter().any(|url| !imagem_valida(url)) {
            erros.push(ErroCampo::new(
                "imagens",
                "Imagens devem ser enviadas pelo upload deste site.",
            ));
        }

        if !erros.is_empty() {
            return Err(AppError::Validacao(erros));
        }

        let links = montar_links_redes_sociais(
            self.instagram.as_deref(),
            self.tiktok.as_deref(),
            self.facebook.as_deref(),
            self.website.as_deref(),
        );

        Ok(AnuncioValidado {
            titulo,
            nome_anunciante,
            descricao,
            categoria_id,
            numero_whatsapp,
            links_redes_sociais: if links.is_empty() {
                None
            } else {
                Some(serde_json::json!(links))
            },
            imagens: if imagens.is_empty() { None } else { Some(imagens) },
            localizacao_endereco: self
                .localizacao_endereco
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        })
    }
}

pub fn somente_digitos(valor: &str) -> String {
    valor.chars().filter(char::is_ascii_digit).collect()
}

/// Formata um telefone brasileiro para exibição, ex.: `(11) 99999-8888`.
pub fn formatar_telefone(valor: &str) -> String {
    let n = somente_digitos(valor);
    match n.len() {
        0 => String::new(),
        1..=2 => format!("({n}"),
        3..=6 => format!("({}) {}", &n[..2], &n[2..]),
        7..=10 => format!("({}) {}-{}", &n[..2], &n[2..6], &n[6..]),
        _ => format!("({}) {}-{}", &n[..2], &n[2..7], &n[7..11]),
    }
}

/// Remove protocolo, `www.` e o domínio da rede, sobrando só o usuário ou a página.
fn extrair_usuario<'a>(valor: &'a str, dominio: &str) -> &'a str {
    let sem_protocolo = valor
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let sem_dominio = sem_protocolo
        .strip_prefix(dominio)
        .and_then(|resto| resto.strip_prefix('/'))
        .unwrap_or(sem_protocolo);
    sem_dominio.trim_end_matches('/')
}

/// Normaliza as redes informadas no formulário para o formato gravado no banco.
/// Campos em branco são ignorados.
pub fn montar_links_redes_sociais(
    instagram: Option<&str>,
    tiktok: Option<&str>,
    facebook: Option<&str>,
    website: Option<&str>,
) -> BTreeMap<String, String> {
    let mut links = BTreeMap::new();

    // O `@` só é removido de handles; no facebook o valor segue como informado
    let redes = [
        ("instagram", "instagram.com", instagram, true),
        ("tiktok", "tiktok.com", tiktok, true),
        ("facebook", "facebook.com", facebook, false),
    ];
    for (rede, dominio, valor, handle) in redes {
        let usuario = valor
            .map(|v| extrair_usuario(v, dominio))
            .map(|u| if handle { u.trim_start_matches('@') } else { u })
            .filter(|u| !u.is_empty());
        if let Some(usuario) = usuario {
            links.insert(rede.to_string(), format!("{dominio}/{usuario}"));
        }
    }

    if let Some(site) = website.map(str::trim).filter(|s| !s.is_empty()) {
        let url = if site.starts_with("http") {
            site.to_string()
        } else {
            format!("https://{site}")
        };
        links.insert("website".to_string(), url);
    }

    links
}

/// Lê o JSON de redes sociais gravado. Aceita também um objeto serializado como texto.
fn mapa_de_links(valor: Option<&serde_json::Value>) -> BTreeMap<String, String> {
    let objeto = match valor {
        Some(serde_json::Value::Object(obj)) => obj.clone(),
        Some(serde_json::Value::String(texto)) => {
            match serde_json::from_str::<serde_json::Value>(texto) {
                Ok(serde_json::Value::Object(obj)) => obj,
                _ => return BTreeMap::new(),
            }
        }
        _ => return BTreeMap::new(),
    };

    objeto
        .into_iter()
        .filter_map(|(rede, url)| match url {
            serde_json::Value::String(u) if !u.trim().is_empty() => Some((rede, u.trim().to_string())),
            _ => None,
        })
        .collect()
}

fn capitalizar(texto: &str) -> String {
    let mut chars = texto.chars();
    match chars.next() {
        Some(primeira) => primeira.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Links prontos para exibição: rede com inicial maiúscula e URL com protocolo.
pub fn links_para_exibicao(valor: Option<&serde_json::Value>) -> Vec<LinkRedeSocial> {
    mapa_de_links(valor)
        .into_iter()
        .map(|(rede, url)| LinkRedeSocial {
            rede: capitalizar(&rede),
            url: if url.starts_with("http") {
                url
            } else {
                format!("https://{url}")
            },
        })
        .collect()
}

/// Extrai os valores crus para preencher o formulário de edição.
pub fn campos_do_formulario(valor: Option<&serde_json::Value>) -> CamposRedesSociais {
    let mapa = mapa_de_links(valor);
    let usuario = |rede: &str, dominio: &str| {
        mapa.get(rede)
            .map(|v| extrair_usuario(v, dominio).to_string())
            .unwrap_or_default()
    };
    CamposRedesSociais {
        instagram: usuario("instagram", "instagram.com"),
        tiktok: usuario("tiktok", "tiktok.com"),
        facebook: usuario("facebook", "facebook.com"),
        website: mapa.get("website").cloned().unwrap_or_default(),
    }
}

/// Filtros da listagem pública (query string). Espaços nas pontas dos valores são
/// ignorados, inclusive no ID de categoria.
#[derive(Debug, Default, Deserialize)]
pub struct FiltroAnuncios {
    pub categoria: Option<String>,
    pub busca: Option<String>,
    pub localizacao: Option<String>,
}

fn termo(valor: &Option<String>) -> Option<String> {
    valor
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl FiltroAnuncios {
    pub fn corresponde(&self, anuncio: &AnuncioResumo) -> bool {
        let categoria_ok = match self.categoria.as_deref().map(str::trim) {
            None | Some("") | Some("todas") => true,
            Some(categoria) => anuncio
                .categoria_id
                .is_some_and(|id| id.to_string() == categoria),
        };

        let busca_ok = termo(&self.busca).map_or(true, |t| {
            anuncio.titulo.to_lowercase().contains(&t)
                || anuncio.descricao.to_lowercase().contains(&t)
        });

        let localizacao_ok = termo(&self.localizacao).map_or(true, |t| {
            anuncio
                .localizacao_endereco
                .as_deref()
                .is_some_and(|endereco| endereco.to_lowercase().contains(&t))
        });

        categoria_ok && busca_ok && localizacao_ok
    }

    /// Mantém a ordem recebida, só removendo o que não corresponde.
    pub fn aplicar(&self, anuncios: Vec<AnuncioResumo>) -> Vec<AnuncioResumo> {
        anuncios.into_iter().filter(|a| self.corresponde(a)).collect()
    }
}
